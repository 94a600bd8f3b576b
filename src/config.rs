//! Per-strip configuration, fixed when the strip is constructed.

use crate::hardware::ChannelSelect;

/// LED chip family, which decides channel count and word width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// WS2812(B): G,R,B, 24 bits per LED.
    #[default]
    Rgb,
    /// SK6812: G,R,B,W, 32 bits per LED.
    Rgbw,
}

impl Variant {
    /// Number of bits the transmitter shifts out of each 32-bit word.
    #[must_use]
    pub const fn bits_per_word(self) -> u8 {
        match self {
            Self::Rgb => 24,
            Self::Rgbw => 32,
        }
    }
}

/// Data rate on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitRate {
    /// 800 kHz, the WS2812B/SK6812 standard.
    #[default]
    Khz800,
    /// 400 kHz, for some legacy WS2811 strips.
    Khz400,
    /// Any other rate, in Hz.
    Hz(u32),
}

impl BitRate {
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        match self {
            Self::Khz800 => 800_000,
            Self::Khz400 => 400_000,
            Self::Hz(hz) => hz,
        }
    }
}

/// Configuration for a [`Strip`](crate::Strip).
///
/// ```
/// use pio_strip::{BitRate, ChannelSelect, StripConfig, Variant};
///
/// const CONFIG: StripConfig = StripConfig::new()
///     .rgbw()
///     .bit_rate(BitRate::Khz400)
///     .channel(ChannelSelect::Index(2))
///     .offload(false);
///
/// assert_eq!(CONFIG.variant, Variant::Rgbw);
/// assert_eq!(CONFIG.bit_rate.as_hz(), 400_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
    pub variant: Variant,
    pub bit_rate: BitRate,
    /// Which state machine to claim at `begin`.
    pub channel: ChannelSelect,
    /// Try to claim a DMA channel; without one every send feeds the FIFO directly.
    pub offload: bool,
}

impl StripConfig {
    /// WS2812 at 800 kHz, auto-claimed state machine, DMA enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variant: Variant::Rgb,
            bit_rate: BitRate::Khz800,
            channel: ChannelSelect::Auto,
            offload: true,
        }
    }

    #[must_use]
    pub const fn rgbw(mut self) -> Self {
        self.variant = Variant::Rgbw;
        self
    }

    #[must_use]
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    #[must_use]
    pub const fn bit_rate(mut self, bit_rate: BitRate) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    #[must_use]
    pub const fn channel(mut self, channel: ChannelSelect) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub const fn offload(mut self, offload: bool) -> Self {
        self.offload = offload;
        self
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self::new()
    }
}
