//! A device abstraction for one WS2812/SK6812 LED strip.
//!
//! See [`Strip`] for the main usage example.

use embassy_time::Timer;

use crate::color::{BLACK, Rgbw, ToRgbw};
use crate::config::StripConfig;
use crate::frame::{FrameWords, StripStatic, encode_frame};
use crate::hardware::{RESET_LATCH, StripResources, WireTiming};
use crate::pipeline::ColorPipeline;
use crate::transfer::{TransferController, TransferState};
use crate::{Error, Result};

type Controller<R> = TransferController<
    <R as StripResources>::Transmitter,
    <R as StripResources>::Offload,
>;

/// Device abstraction for a single addressable LED strip of `N` LEDs.
///
/// Construction never touches hardware; [`begin`](Self::begin) claims a PIO
/// state machine (and a DMA channel when one is free) from the pool you pass
/// in, and [`end`](Self::end) gives them back.
///
/// Pixel writes only change the in-memory buffer. [`show`](Self::show) encodes
/// the buffer through gamma and brightness into the strip's static frame and
/// sends it, returning after the 80 µs reset latch. [`start_show`](Self::start_show)
/// returns as soon as the DMA engine has the frame, so the next frame can be
/// drawn while this one goes out; call [`wait`](Self::wait) before sending again.
/// Without a DMA channel `start_show` feeds the FIFO itself and only returns
/// once every word is queued.
///
/// Not re-entrant: drive each strip from one task.
///
/// # Example
///
/// Firmware only (needs the `pico1` or `pico2` feature):
///
/// ```ignore
/// use pio_strip::rp::PioResources;
/// use pio_strip::{Result, Strip, StripConfig, StripStatic, hsv};
///
/// async fn example(p: embassy_rp::Peripherals) -> Result<()> {
///     static STRIP_STATIC: StripStatic<30> = StripStatic::new_static();
///
///     let mut pio0 = PioResources::new(p.PIO0, [p.DMA_CH0.into()]);
///     let pin = pio0.make_pin(p.PIN_16);
///     let mut strip = Strip::new(&STRIP_STATIC, pin, StripConfig::new())?;
///     strip.begin(&mut pio0)?;
///
///     strip.enable_gamma(true);
///     strip.set_brightness(128);
///     for index in 0..strip.len() {
///         strip.set_pixel(index, hsv(index as f32 * 8.0, 1.0, 0.4));
///     }
///     strip.show().await
/// }
/// ```
pub struct Strip<R: StripResources, const N: usize> {
    transfer: Option<Controller<R>>,
    frame: &'static mut [u32; N],
    pixels: [Rgbw; N],
    pipeline: ColorPipeline,
    pin: R::Pin,
    config: StripConfig,
}

impl<R: StripResources, const N: usize> Strip<R, N> {
    /// Number of LEDs in the strip.
    pub const LEN: usize = N;

    /// Creates a strip bound to its static frame storage. No hardware is touched.
    ///
    /// # Errors
    ///
    /// [`Error::StaticAlreadyUsed`] if `strip_static` already backs another strip.
    pub fn new(
        strip_static: &'static StripStatic<N>,
        pin: R::Pin,
        config: StripConfig,
    ) -> Result<Self> {
        Ok(Self {
            transfer: None,
            frame: strip_static.take_frame()?,
            pixels: [BLACK; N],
            pipeline: ColorPipeline::new(config.variant),
            pin,
            config,
        })
    }

    /// Claims the hardware and clears the buffer (nothing is sent).
    ///
    /// A missing DMA channel is not an error: the strip falls back to feeding
    /// the FIFO from the CPU. Calling `begin` on a started strip does nothing.
    ///
    /// # Errors
    ///
    /// Fails if no usable state machine can be claimed or the timing program
    /// does not fit; the strip then holds no hardware and every send returns
    /// [`Error::NotStarted`].
    pub fn begin(&mut self, resources: &mut R) -> Result<()> {
        if self.transfer.is_some() {
            return Ok(());
        }

        let timing = self.wire_timing();
        let transmitter = resources
            .claim_transmitter(&self.pin, self.config.channel, timing)
            .inspect_err(|_err| {
                #[cfg(feature = "defmt")]
                defmt::warn!("strip begin failed: {}", _err);
            })?;

        let offload = if self.config.offload {
            let offload = resources.claim_offload(&transmitter);
            if offload.is_none() {
                #[cfg(feature = "defmt")]
                defmt::warn!("no free DMA channel; strip falls back to CPU-fed FIFO");
            }
            offload
        } else {
            None
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "strip of {} LEDs started: {} at {} Hz, dma={}",
            N,
            self.config.variant,
            timing.bit_rate_hz,
            offload.is_some()
        );

        self.transfer = Some(TransferController::new(transmitter, offload, timing));
        self.clear();
        Ok(())
    }

    /// Aborts any transfer and releases the claimed hardware. Idempotent.
    ///
    /// The strip may be left showing a partial frame. `begin` may be called again.
    pub fn end(&mut self, resources: &mut R) {
        let Some(mut transfer) = self.transfer.take() else {
            return;
        };
        transfer.abort();
        let (transmitter, offload) = transfer.into_parts();
        if let Some(offload) = offload {
            resources.release_offload(offload);
        }
        resources.release_transmitter(transmitter);

        #[cfg(feature = "defmt")]
        defmt::info!("strip of {} LEDs released", N);
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.transfer.is_some()
    }

    /// `true` when a DMA channel was claimed at `begin`.
    #[must_use]
    pub fn has_offload(&self) -> bool {
        self.transfer
            .as_ref()
            .is_some_and(TransferController::has_offload)
    }

    /// Number of LEDs (valid indices are `0..len()`).
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[must_use]
    pub const fn config(&self) -> &StripConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Buffer
    // ------------------------------------------------------------------

    /// Set one pixel. Out-of-range indices are ignored.
    ///
    /// An RGB color stores a zero white channel. An RGBW color on an RGB strip
    /// keeps its white channel in the buffer; it is only dropped when encoding.
    pub fn set_pixel(&mut self, index: usize, color: impl ToRgbw) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color.to_rgbw();
        }
    }

    /// Set one pixel from separate channels. Out-of-range indices are ignored.
    pub fn set_pixel_rgb(&mut self, index: usize, r: u8, g: u8, b: u8) {
        self.set_pixel(index, (r, g, b));
    }

    /// Set every pixel to one color.
    pub fn set_all(&mut self, color: impl ToRgbw) {
        self.pixels.fill(color.to_rgbw());
    }

    /// Set every pixel to black. Does not send.
    pub fn clear(&mut self) {
        self.pixels.fill(BLACK);
    }

    /// Stored color at `index`, or `None` when out of range.
    #[must_use]
    pub fn pixel(&self, index: usize) -> Option<Rgbw> {
        self.pixels.get(index).copied()
    }

    #[must_use]
    pub const fn pixels(&self) -> &[Rgbw; N] {
        &self.pixels
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Global brightness, applied to every channel at send time.
    pub const fn set_brightness(&mut self, brightness: u8) {
        self.pipeline.set_brightness(brightness);
    }

    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.pipeline.brightness()
    }

    /// Turn ~2.2 gamma correction on or off.
    pub fn enable_gamma(&mut self, on: bool) {
        self.pipeline.enable_gamma(on);
    }

    #[must_use]
    pub const fn gamma_enabled(&self) -> bool {
        self.pipeline.gamma_enabled()
    }

    #[must_use]
    pub const fn pipeline(&self) -> &ColorPipeline {
        &self.pipeline
    }

    // ------------------------------------------------------------------
    // Transmission
    // ------------------------------------------------------------------

    /// Send the buffer and wait until it has latched.
    ///
    /// Returns after the last bit is out and the 80 µs reset latch has elapsed.
    ///
    /// # Errors
    ///
    /// [`Error::NotStarted`] before `begin`, [`Error::TransferInFlight`] if a
    /// [`start_show`](Self::start_show) has not finished yet.
    pub async fn show(&mut self) -> Result<()> {
        self.start_show().await?;
        self.wait().await;
        Ok(())
    }

    /// Encode the buffer into the static frame and start sending it.
    ///
    /// With DMA this returns immediately; poll [`is_busy`](Self::is_busy) or
    /// call [`wait`](Self::wait) before the next send. Without DMA it returns
    /// once every word is in the FIFO.
    ///
    /// # Errors
    ///
    /// [`Error::NotStarted`] before `begin`. [`Error::TransferInFlight`] while
    /// the DMA engine still reads the previous frame; that frame is left intact.
    pub async fn start_show(&mut self) -> Result<()> {
        let transfer = self.transfer.as_mut().ok_or(Error::NotStarted)?;
        if transfer.is_busy() {
            return Err(Error::TransferInFlight);
        }

        encode_frame(&self.pixels, &self.pipeline, self.frame);

        #[cfg(feature = "defmt")]
        defmt::debug!("strip: sending {} words", N);

        transfer.start(FrameWords::new(self.frame.as_slice())).await;
        Ok(())
    }

    /// `true` while DMA is still copying the frame. Always `false` without DMA.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.transfer
            .as_ref()
            .is_some_and(TransferController::is_busy)
    }

    #[must_use]
    pub fn transfer_state(&self) -> TransferState {
        self.transfer
            .as_ref()
            .map_or(TransferState::Idle, TransferController::state)
    }

    /// Wait for the transfer to finish, then for the reset latch.
    ///
    /// The latch delay always runs, even with nothing in flight.
    pub async fn wait(&self) {
        if let Some(transfer) = self.transfer.as_ref() {
            transfer.wait().await;
        } else {
            Timer::after(RESET_LATCH).await;
        }
    }

    /// The most recently encoded frame.
    #[must_use]
    pub fn frame(&self) -> &[u32; N] {
        &*self.frame
    }

    fn wire_timing(&self) -> WireTiming {
        WireTiming {
            bit_rate_hz: self.config.bit_rate.as_hz(),
            bits_per_word: self.config.variant.bits_per_word(),
        }
    }
}

impl<R: StripResources, const N: usize> Drop for Strip<R, N> {
    fn drop(&mut self) {
        // Without the pool the channels cannot be returned, only stopped.
        if let Some(transfer) = self.transfer.as_mut() {
            transfer.abort();
        }
    }
}
