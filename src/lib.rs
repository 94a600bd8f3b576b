//! Driver for WS2812/SK6812 addressable LED strips on RP2040/RP2350 PIO.
//!
//! A [`Strip`] owns a pixel buffer and a [`ColorPipeline`] (gamma, then
//! brightness). Sending encodes the buffer into a static frame of wire words
//! and streams it out through a PIO state machine, fed by DMA when a channel
//! is free and by the CPU otherwise.
//!
//! Hardware lives behind [`StripResources`]: [`rp::PioResources`] on the chip,
//! [`sim::SimResources`] on the host.
#![cfg_attr(not(test), no_std)]

mod color;
mod config;
mod error;
mod frame;
mod gamma;
mod hardware;
mod pipeline;
mod strip;
mod transfer;

#[cfg(any(feature = "pico1", feature = "pico2"))]
mod pio_irqs;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub mod rp;
#[cfg(any(test, feature = "host"))]
pub mod sim;

pub use color::{BLACK, Rgb, Rgbw, ToRgbw, colors, hsv, rgbw};
pub use config::{BitRate, StripConfig, Variant};
pub use error::{Error, Result};
pub use frame::{FrameWords, StripStatic, encode_frame};
pub use gamma::{GAMMA_EXPONENT, GammaTable};
pub use hardware::{
    BitStreamTransmitter, CYCLES_PER_BIT, ChannelSelect, OffloadEngine, RESET_LATCH,
    StripResources, T1, T2, T3, WireTiming,
};
pub use pipeline::{ColorPipeline, scale_brightness};
pub use strip::Strip;
pub use transfer::{TransferController, TransferState};
