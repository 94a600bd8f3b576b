//! 8-bit gamma lookup table.

/// Exponent of the perceptual correction curve.
pub const GAMMA_EXPONENT: f32 = 2.2;

/// Maps each 8-bit input level to a corrected 8-bit output level.
///
/// Either the identity (correction off) or `round((v / 255)^2.2 * 255)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GammaTable([u8; 256]);

impl GammaTable {
    /// The identity mapping.
    #[must_use]
    pub fn identity() -> Self {
        Self::from_fn(|level| level)
    }

    /// The ~2.2 power curve.
    #[must_use]
    pub fn power_2_2() -> Self {
        Self::from_fn(|level| {
            let x = f32::from(level) / 255.0;
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "x^2.2 stays in 0.0..=1.0"
            )]
            let corrected = libm::roundf(libm::powf(x, GAMMA_EXPONENT) * 255.0) as u8;
            corrected
        })
    }

    fn from_fn(curve: impl Fn(u8) -> u8) -> Self {
        let mut table = [0u8; 256];
        for (level, out) in (0u8..=255).zip(table.iter_mut()) {
            *out = curve(level);
        }
        Self(table)
    }

    /// Corrected level for `level`.
    #[inline]
    #[must_use]
    pub fn get(&self, level: u8) -> u8 {
        self.0.get(usize::from(level)).copied().unwrap_or(level)
    }

    #[must_use]
    pub const fn as_array(&self) -> &[u8; 256] {
        &self.0
    }
}

impl Default for GammaTable {
    fn default() -> Self {
        Self::identity()
    }
}
