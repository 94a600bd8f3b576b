//! Seams to the hardware: the bit-stream transmitter, the offload engine,
//! and the pool both are claimed from.
//!
//! A [`Strip`](crate::Strip) never touches registers itself. It claims an
//! exclusive [`BitStreamTransmitter`] (and optionally an [`OffloadEngine`])
//! from a [`StripResources`] pool in `begin`, and hands them back in `end`.
//! The pool also owns the per-block record of whether the timing program is
//! already loaded, so nothing here is a global.

use embassy_time::Duration;

use crate::frame::FrameWords;
use crate::{Error, Result};

/// PIO cycles the line is held low before every bit.
pub const T1: u8 = 2;
/// PIO cycles the line is high for a 1 (and low for a 0) after the start pulse.
pub const T2: u8 = 5;
/// PIO cycles of the fixed high start pulse.
pub const T3: u8 = 3;
/// PIO cycles per transmitted bit.
pub const CYCLES_PER_BIT: u32 = (T1 + T2 + T3) as u32;

/// Minimum idle time on the data line before the LEDs latch a frame.
pub const RESET_LATCH: Duration = Duration::from_micros(80);

// PIO clock divider limits in 24.8 fixed point.
const DIVIDER_MIN_BITS: u64 = 1 << 8;
const DIVIDER_MAX_BITS: u64 = 65_536 << 8;

/// Which transmitter channel (PIO state machine) a strip claims.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelSelect {
    /// First free one.
    #[default]
    Auto,
    /// Exactly this one (0..=3).
    Index(u8),
}

/// Signal parameters the transmitter is configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WireTiming {
    pub bit_rate_hz: u32,
    /// Top bits of each word shifted out, MSB first: 24 or 32.
    pub bits_per_word: u8,
}

impl WireTiming {
    /// Time to shift one word onto the wire, rounded up.
    #[must_use]
    pub fn word_time(&self) -> Duration {
        let bit_rate = u64::from(self.bit_rate_hz.max(1));
        let bits = u64::from(self.bits_per_word);
        Duration::from_micros((bits * 1_000_000).div_ceil(bit_rate))
    }

    /// PIO clock divider, as 24.8 fixed-point bits, that runs one bit every
    /// [`CYCLES_PER_BIT`] cycles at this rate. Rounded to the nearest 1/256.
    ///
    /// ```
    /// use pio_strip::WireTiming;
    ///
    /// let timing = WireTiming { bit_rate_hz: 800_000, bits_per_word: 24 };
    /// // 125 MHz / (800 kHz * 10) = 15.625
    /// assert_eq!(timing.clock_divider_bits(125_000_000), Ok(4000));
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::BitRateOutOfRange`] when the divider falls outside `1..=65536`.
    pub fn clock_divider_bits(&self, sys_clock_hz: u32) -> Result<u32> {
        let out_of_range = Error::BitRateOutOfRange(self.bit_rate_hz);
        let cycle_rate = u64::from(self.bit_rate_hz) * u64::from(CYCLES_PER_BIT);
        if cycle_rate == 0 {
            return Err(out_of_range);
        }
        let divider_bits = ((u64::from(sys_clock_hz) << 8) + cycle_rate / 2) / cycle_rate;
        if !(DIVIDER_MIN_BITS..=DIVIDER_MAX_BITS).contains(&divider_bits) {
            return Err(out_of_range);
        }
        u32::try_from(divider_bits).map_err(|_| out_of_range)
    }
}

/// Timing engine that turns words into the single-wire LED waveform.
#[allow(async_fn_in_trait, reason = "used from a single executor; no Send bound needed")]
pub trait BitStreamTransmitter {
    /// Queue one word, waiting while the FIFO is full.
    async fn push(&mut self, word: u32);

    /// `true` once every queued word has moved into the output shifter.
    fn is_fifo_empty(&self) -> bool;

    /// Index of the claimed channel.
    fn index(&self) -> u8;
}

/// Bulk-copy engine that feeds a transmitter without CPU involvement.
pub trait OffloadEngine {
    /// Start copying `words` into the transmitter.
    ///
    /// The engine reads `words` after this returns. They live in a
    /// [`StripStatic`](crate::StripStatic), so they are never freed; the strip
    /// leaves them unmodified until [`is_busy`](Self::is_busy) reports `false`
    /// or [`abort`](Self::abort) is called.
    fn start(&mut self, words: FrameWords<'_>);

    /// `true` while words remain to be copied.
    fn is_busy(&self) -> bool;

    /// Stop immediately. The strip may show a partial frame.
    fn abort(&mut self);
}

/// Pool of claimable transmitter and offload channels for one hardware block.
pub trait StripResources {
    /// Output pin handle the transmitter drives.
    type Pin;
    type Transmitter: BitStreamTransmitter;
    type Offload: OffloadEngine;

    /// Claim and configure a transmitter, loading the timing program on first use.
    ///
    /// A reclaimed transmitter starts with an empty FIFO and a restarted program.
    ///
    /// # Errors
    ///
    /// Fails when the requested channel is taken, does not exist, no channel
    /// is free, the bit rate is out of range, or the program does not fit.
    /// Nothing stays claimed on failure.
    fn claim_transmitter(
        &mut self,
        pin: &Self::Pin,
        channel: ChannelSelect,
        timing: WireTiming,
    ) -> Result<Self::Transmitter>;

    /// Claim an offload channel wired to `transmitter`, if one is free.
    fn claim_offload(&mut self, transmitter: &Self::Transmitter) -> Option<Self::Offload>;

    /// Disable a transmitter, drop whatever is still queued in it, and return it to the pool.
    fn release_transmitter(&mut self, transmitter: Self::Transmitter);

    /// Return an (already aborted) offload channel to the pool.
    fn release_offload(&mut self, offload: Self::Offload);
}
