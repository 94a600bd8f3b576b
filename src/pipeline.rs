//! Pixel → wire word: gamma, brightness, then channel reorder and bit alignment.

use crate::color::Rgbw;
use crate::config::Variant;
use crate::gamma::GammaTable;

/// Scale a single color component by brightness (0-255), rounding to nearest.
///
/// `(value * brightness + 127) / 255` in 16-bit arithmetic, so brightness 255
/// is the identity and brightness 0 is always black.
#[inline]
#[must_use]
pub const fn scale_brightness(value: u8, brightness: u8) -> u8 {
    let scaled = (value as u16 * brightness as u16 + 127) / 255;
    #[allow(clippy::cast_possible_truncation, reason = "scaled <= 255")]
    let scaled = scaled as u8;
    scaled
}

/// Per-strip rendering state applied to every pixel at encode time.
///
/// Nothing here touches the pixel buffer; brightness and gamma are reapplied
/// on every frame.
#[derive(Clone, Debug)]
pub struct ColorPipeline {
    variant: Variant,
    brightness: u8,
    gamma_enabled: bool,
    gamma: GammaTable,
}

impl ColorPipeline {
    /// Full brightness, gamma correction off.
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            brightness: u8::MAX,
            gamma_enabled: false,
            gamma: GammaTable::identity(),
        }
    }

    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub const fn brightness(&self) -> u8 {
        self.brightness
    }

    pub const fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    #[must_use]
    pub const fn gamma_enabled(&self) -> bool {
        self.gamma_enabled
    }

    /// Rebuilds the lookup table: the 2.2 curve when on, identity when off.
    pub fn enable_gamma(&mut self, on: bool) {
        self.gamma_enabled = on;
        self.gamma = if on {
            GammaTable::power_2_2()
        } else {
            GammaTable::identity()
        };
    }

    #[must_use]
    pub const fn gamma_table(&self) -> &GammaTable {
        &self.gamma
    }

    #[inline]
    fn channel(&self, value: u8) -> u8 {
        let value = if self.gamma_enabled {
            self.gamma.get(value)
        } else {
            value
        };
        scale_brightness(value, self.brightness)
    }

    /// Encode one pixel into the word the transmitter shifts out MSB first.
    ///
    /// RGB strips get `G,R,B` in bits 31..8 with a zero low byte (the state
    /// machine pulls 24 bits per word). RGBW strips get `G,R,B,W` filling all
    /// 32 bits. The white channel of an RGB strip is dropped here, never in storage.
    #[must_use]
    pub fn encode(&self, pixel: Rgbw) -> u32 {
        let r = u32::from(self.channel(pixel.r));
        let g = u32::from(self.channel(pixel.g));
        let b = u32::from(self.channel(pixel.b));
        match self.variant {
            Variant::Rgb => ((g << 16) | (r << 8) | b) << 8,
            Variant::Rgbw => {
                let w = u32::from(self.channel(pixel.a.0));
                (g << 24) | (r << 16) | (b << 8) | w
            }
        }
    }
}
