use crate::dsp::WindowKind;
use crate::error::{Error, Result};

use super::palette::Palette;
use super::result::{ColorDepth, Orientation};

/// Everything a render needs besides the samples.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    /// Transform size, a power of two. Also the image height in rows.
    pub fft_size: usize,
    pub window: WindowKind,
    /// Added to every level, in dB.
    pub gain: f64,
    /// Dynamic range mapped onto the palette, in dB.
    pub range: f64,
    pub palette: Palette,
    /// Number of output columns.
    pub width: usize,
    /// Column tiles to split the render into; 0 uses one per worker.
    pub tiles: usize,
    pub orientation: Orientation,
    pub depth: ColorDepth,
    /// Treat I and Q as two independent real channels.
    pub dual_channel: bool,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            fft_size: 512,
            window: WindowKind::BlackmanHarris,
            gain: 6.0,
            range: 30.0,
            palette: Palette::default(),
            width: 3000,
            tiles: 0,
            orientation: Orientation::Spectrogram,
            depth: ColorDepth::Rgba,
            dual_channel: false,
        }
    }
}

impl RenderParams {
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() {
            return Err(Error::InvalidSize(self.fft_size));
        }
        if self.width == 0 {
            return Err(Error::InvalidParameter("output width must be at least 1".into()));
        }
        if !(self.range.is_finite() && self.range > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "range must be a positive number of dB, got {}",
                self.range
            )));
        }
        if !self.gain.is_finite() {
            return Err(Error::InvalidParameter(format!("gain must be finite, got {}", self.gain)));
        }
        let image_bytes = self
            .width
            .checked_mul(self.fft_size)
            .and_then(|pixels| pixels.checked_mul(self.depth.bytes_per_pixel()));
        if image_bytes.map_or(true, |bytes| bytes > isize::MAX as usize) {
            return Err(Error::InvalidParameter(format!(
                "a {} x {} image does not fit in memory",
                self.width, self.fft_size
            )));
        }
        if self.depth == ColorDepth::Indexed && self.palette.len() > 256 {
            return Err(Error::InvalidParameter(format!(
                "indexed output holds at most 256 colours, palette has {}",
                self.palette.len()
            )));
        }
        Ok(())
    }

    /// Tile count for a pool of `workers` threads.
    pub fn tile_count(&self, workers: usize) -> usize {
        let tiles = if self.tiles == 0 { workers } else { self.tiles };
        tiles.clamp(1, self.width.max(1))
    }
}
