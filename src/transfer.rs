//! Transmission lifecycle for one strip: which path a frame takes, whether it
//! is still in flight, and the reset latch after it.

use embassy_futures::yield_now;
use embassy_time::{Duration, Timer};

use crate::frame::FrameWords;
use crate::hardware::{BitStreamTransmitter, OffloadEngine, RESET_LATCH, WireTiming};

/// Whether a transfer is running. Never stored: read from the offload engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    Idle,
    InFlight,
}

/// Owns the claimed transmitter and, when one was free, the offload engine.
pub struct TransferController<T, O> {
    transmitter: T,
    offload: Option<O>,
    /// Time the final word spends in the output shifter after the FIFO empties.
    word_time: Duration,
}

impl<T: BitStreamTransmitter, O: OffloadEngine> TransferController<T, O> {
    pub fn new(transmitter: T, offload: Option<O>, timing: WireTiming) -> Self {
        Self {
            transmitter,
            offload,
            word_time: timing.word_time(),
        }
    }

    #[must_use]
    pub const fn has_offload(&self) -> bool {
        self.offload.is_some()
    }

    /// Start sending `words`.
    ///
    /// With an offload engine this returns as soon as the engine is running,
    /// and `words` must stay untouched until [`is_busy`](Self::is_busy) is false.
    /// Without one every word is pushed into the FIFO before returning.
    pub async fn start(&mut self, words: FrameWords<'_>) {
        if let Some(offload) = self.offload.as_mut() {
            offload.start(words);
        } else {
            for word in words.as_slice() {
                self.transmitter.push(*word).await;
            }
        }
    }

    /// `true` while the offload engine is copying. Always `false` without one.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.offload.as_ref().is_some_and(OffloadEngine::is_busy)
    }

    #[must_use]
    pub fn state(&self) -> TransferState {
        if self.is_busy() {
            TransferState::InFlight
        } else {
            TransferState::Idle
        }
    }

    /// Wait until the engine is idle, then hold the line for the reset latch.
    ///
    /// The latch is measured from the last bit, not from the last DMA write:
    /// the FIFO drains and the final word shifts out first. The latch delay is
    /// unconditional. There is no timeout: a stalled engine stalls the caller.
    pub async fn wait(&self) {
        while self.is_busy() || !self.transmitter.is_fifo_empty() {
            yield_now().await;
        }
        Timer::after(self.word_time + RESET_LATCH).await;
    }

    /// Stop any transfer now.
    pub fn abort(&mut self) {
        if let Some(offload) = self.offload.as_mut() {
            offload.abort();
        }
    }

    /// Hand back the claimed channels.
    pub fn into_parts(self) -> (T, Option<O>) {
        (self.transmitter, self.offload)
    }
}
