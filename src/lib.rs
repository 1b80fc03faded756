//! Spectrogram rendering for raw I/Q captures and stereo audio.
//!
//! Bytes are interpreted through a [`SampleFormat`], cut into overlapping
//! transform blocks, windowed, transformed and mapped to palette colours.
//! The output width is split into column tiles rendered in parallel by a
//! [`SpectrogramEngine`] and merged into one [`SpectrogramResult`].

pub mod audio;
pub mod dsp;
pub mod error;
pub mod render;
pub mod samples;

pub use dsp::WindowKind;
pub use error::{Error, Result};
pub use render::{
    ColorDepth, NamedPalette, Orientation, Palette, RenderInfo, RenderParams, SpectrogramEngine,
    SpectrogramResult,
};
pub use samples::{SampleBuffer, SampleFormat};
