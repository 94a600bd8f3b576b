//! Pixel colors: the stored four-channel form, conversions into it, and HSV.

/// 8-bit-per-channel RGB color re-exported from the
/// [`smart_leds`](https://docs.rs/smart-leds/latest/smart_leds/index.html) crate.
pub type Rgb = smart_leds::RGB8;

/// 8-bit-per-channel RGBW color. The white channel lives in `a.0`.
///
/// Every pixel is stored in this form regardless of the strip variant; an RGB
/// strip simply never transmits the white channel.
pub type Rgbw = smart_leds::RGBW<u8>;

/// Predefined RGB color constants, re-exported from `smart_leds`.
pub use smart_leds::colors;

/// All channels off.
pub const BLACK: Rgbw = rgbw(0, 0, 0, 0);

/// Builds an [`Rgbw`] in a `const` context.
#[must_use]
pub const fn rgbw(r: u8, g: u8, b: u8, w: u8) -> Rgbw {
    Rgbw {
        r,
        g,
        b,
        a: smart_leds::White(w),
    }
}

/// Convert a color to the stored [`Rgbw`] form.
///
/// Three-channel colors get a zero white channel.
///
/// ```
/// use pio_strip::{Rgb, ToRgbw, rgbw};
///
/// assert_eq!(Rgb::new(1, 2, 3).to_rgbw(), rgbw(1, 2, 3, 0));
/// assert_eq!((1, 2, 3, 4).to_rgbw(), rgbw(1, 2, 3, 4));
/// ```
pub trait ToRgbw {
    #[must_use]
    fn to_rgbw(self) -> Rgbw;
}

impl ToRgbw for Rgbw {
    #[inline(always)]
    fn to_rgbw(self) -> Rgbw {
        self
    }
}

impl ToRgbw for Rgb {
    #[inline(always)]
    fn to_rgbw(self) -> Rgbw {
        rgbw(self.r, self.g, self.b, 0)
    }
}

impl ToRgbw for (u8, u8, u8) {
    #[inline(always)]
    fn to_rgbw(self) -> Rgbw {
        rgbw(self.0, self.1, self.2, 0)
    }
}

impl ToRgbw for (u8, u8, u8, u8) {
    #[inline(always)]
    fn to_rgbw(self) -> Rgbw {
        rgbw(self.0, self.1, self.2, self.3)
    }
}

/// Hue/saturation/value to RGB, six-sector hexagonal model.
///
/// `hue` is in degrees and wraps (negative values wrap positive). `saturation`
/// and `value` are clamped to `0.0..=1.0`. Channels round to the nearest integer.
///
/// ```
/// use pio_strip::{Rgb, hsv};
///
/// assert_eq!(hsv(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
/// assert_eq!(hsv(-120.0, 1.0, 1.0), Rgb::new(0, 0, 255));
/// ```
#[must_use]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Rgb {
    let mut hue = libm::fmodf(hue, 360.0);
    if hue < 0.0 {
        hue += 360.0;
    }
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);

    let chroma = value * saturation;
    let x = chroma * (1.0 - libm::fabsf(libm::fmodf(hue / 60.0, 2.0) - 1.0));
    let m = value - chroma;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "hue is in 0.0..360.0 so the sector is 0..=5"
    )]
    let sector = (hue / 60.0) as u8;
    let (r, g, b) = match sector {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    Rgb::new(unit_to_u8(r + m), unit_to_u8(g + m), unit_to_u8(b + m))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "input is clamped to 0.0..=1.0"
)]
fn unit_to_u8(unit: f32) -> u8 {
    libm::roundf(unit.clamp(0.0, 1.0) * 255.0) as u8
}
