//! Whole-buffer encoding and the static storage the encoded frame lives in.

use static_cell::StaticCell;

use crate::color::Rgbw;
use crate::pipeline::ColorPipeline;
use crate::{Error, Result};

/// Encode every pixel, index 0 first, into `words`.
///
/// Always the full buffer: a send reflects exactly what the buffer holds now.
pub fn encode_frame<const N: usize>(
    pixels: &[Rgbw; N],
    pipeline: &ColorPipeline,
    words: &mut [u32; N],
) {
    for (word, pixel) in words.iter_mut().zip(pixels.iter()) {
        *word = pipeline.encode(*pixel);
    }
}

/// Encoded words handed to an [`OffloadEngine`](crate::OffloadEngine).
///
/// Only a [`Strip`](crate::Strip) can make one, and it always points into the
/// frame held by a [`StripStatic`], so an engine that keeps reading after
/// `start` returns never reads freed memory. Code outside the crate cannot
/// wrap its own slice:
///
/// ```compile_fail
/// use pio_strip::FrameWords;
///
/// let words = [0u32; 4];
/// let frame = FrameWords(&words);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameWords<'a>(&'a [u32]);

impl<'a> FrameWords<'a> {
    /// `words` must live in a [`StripStatic`] frame.
    pub(crate) const fn new(words: &'a [u32]) -> Self {
        Self(words)
    }

    #[must_use]
    pub const fn as_slice(&self) -> &'a [u32] {
        self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Static resources backing a [`Strip`](crate::Strip) instance.
///
/// Holds the encoded frame the DMA engine reads from. Because it is `static`,
/// the words stay put for the whole transfer even if the `Strip` value moves.
///
/// ```
/// use pio_strip::StripStatic;
///
/// static STRIP_STATIC: StripStatic<30> = StripStatic::new_static();
/// assert_eq!(StripStatic::<30>::LEN, 30);
/// ```
pub struct StripStatic<const N: usize> {
    frame: StaticCell<[u32; N]>,
}

impl<const N: usize> StripStatic<N> {
    /// Number of LEDs in the strip.
    pub const LEN: usize = N;

    #[must_use]
    pub const fn new_static() -> Self {
        Self {
            frame: StaticCell::new(),
        }
    }

    /// Hands out the frame buffer. Succeeds once per static.
    pub(crate) fn take_frame(&'static self) -> Result<&'static mut [u32; N]> {
        self.frame
            .try_init([0; N])
            .ok_or(Error::StaticAlreadyUsed)
    }
}
