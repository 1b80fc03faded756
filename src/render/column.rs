use std::sync::Arc;

use crate::dsp::{Fft, WindowCoefficients};
use crate::error::Result;
use crate::samples::SampleView;

use super::palette::Palette;
use super::result::{
    ColorDepth, Orientation, RenderTileResult, DBFS_MAX_START, DBFS_MIN_START,
    DB_HISTOGRAM_BUCKETS,
};

/// Per-render constants shared by every column of every tile.
#[derive(Clone, Debug)]
pub struct ColumnRenderer {
    fft: Arc<Fft>,
    window: WindowCoefficients,
    /// Palette with saturation marks already applied.
    palette: Palette,
    gain: f64,
    range: f64,
    block_norm_db: f64,
    color_max: f64,
    color_norm: f64,
    orientation: Orientation,
    depth: ColorDepth,
    dual_channel: bool,
}

/// Transform buffers owned by one worker for the duration of a tile.
#[derive(Debug)]
pub struct ColumnScratch {
    real: Vec<f64>,
    imag: Vec<f64>,
}

impl ColumnScratch {
    pub fn new(n: usize) -> Self {
        Self { real: vec![0.0; n], imag: vec![0.0; n] }
    }
}

/// Sample position where a column's transform block starts.
pub fn column_base(stride: f64, x: usize) -> usize {
    (stride * x as f64 + 0.5).floor() as usize
}

/// Display row of FFT bin `i`: zero frequency on the centre row, positive
/// frequencies above it and negative frequencies below.
pub fn fold_row(i: usize, n: usize) -> usize {
    if i <= n / 2 {
        n / 2 - i
    } else {
        n / 2 + n - i
    }
}

/// Quantises a dB level relative to full range into a 0-255 gauge byte.
pub fn gauge_byte(db: f64, range: f64) -> u8 {
    ((range + db) * 255.0 / range).round().clamp(0.0, 255.0) as u8
}

/// dB histogram bucket of a level below full scale, clamped to the edges.
pub fn db_bucket(db: f64) -> usize {
    let bucket = (-10.0 * db + 0.5).floor();
    if bucket.is_nan() {
        return 0;
    }
    bucket.clamp(0.0, (DB_HISTOGRAM_BUCKETS - 1) as f64) as usize
}

impl ColumnRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fft: Arc<Fft>,
        window: WindowCoefficients,
        palette: &Palette,
        gain: f64,
        range: f64,
        orientation: Orientation,
        depth: ColorDepth,
        dual_channel: bool,
    ) -> Self {
        let palette = palette.with_saturation_marks();
        let block_norm_db = window.block_norm_db();
        let color_max = (palette.len() - 1) as f64;
        let color_norm = palette.len() as f64 / -range;
        log::debug!(
            "block_norm={} ({:.2} dB), window weight={}, colors={}, color_norm={}",
            fft.len(),
            block_norm_db,
            window.weight(),
            palette.len(),
            color_norm
        );
        Self {
            fft,
            window,
            palette,
            gain,
            range,
            block_norm_db,
            color_max,
            color_norm,
            orientation,
            depth,
            dual_channel,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft.len()
    }

    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Palette index for a gain-adjusted dBFS level.
    pub fn palette_index(&self, dbfs: f64) -> usize {
        let unclamped = self.color_max - dbfs * self.color_norm;
        if unclamped.is_nan() {
            return 0;
        }
        (unclamped.clamp(0.0, self.color_max) + 0.5).floor() as usize
    }

    /// Byte offset of pixel (`x`, `y`) inside a tile `columns` wide.
    fn pixel_offset(&self, x: usize, y: usize, columns: usize) -> usize {
        let n = self.fft_size();
        let pixel = match (self.orientation, self.depth) {
            (Orientation::Spectrogram, _) => x + columns * y,
            (Orientation::Waterfall, ColorDepth::Indexed) => n * x + y,
            // Newest column on top, highest frequency on the left.
            (Orientation::Waterfall, ColorDepth::Rgba) => n * (columns - 1 - x) + (n - 1 - y),
        };
        pixel * self.depth.bytes_per_pixel()
    }

    /// Renders tile column `x` whose block starts at sample `base`.
    ///
    /// `view` must cover `base..base + n`.
    pub fn render(
        &self,
        view: &SampleView<'_>,
        base: usize,
        x: usize,
        tile: &mut RenderTileResult,
        scratch: &mut ColumnScratch,
    ) -> Result<()> {
        let n = self.fft_size();
        let ColumnScratch { real, imag } = scratch;

        for (k, &w) in self.window.coefficients().iter().enumerate() {
            real[k] = w * view.sample_i(base + k);
            imag[k] = w * view.sample_q(base + k);
        }

        self.fft.transform(real, imag)?;
        if self.dual_channel {
            self.fft.split_real(real, imag)?;
        }

        let mut column_min = DBFS_MIN_START;
        let mut column_max = DBFS_MAX_START;

        for i in 0..n {
            let y = fold_row(i, n);
            let abs2 = real[i] * real[i] + imag[i] * imag[i];
            let dbfs = 5.0 * abs2.log10() + self.block_norm_db + self.gain;
            let level = dbfs - self.gain;

            if level < column_min {
                column_min = level;
            }
            if level > column_max {
                column_max = level;
            }

            tile.db_histogram[db_bucket(level)] += 1;

            let index = self.palette_index(dbfs);
            tile.color_histogram[index] += 1;

            let offset = self.pixel_offset(x, y, tile.columns);
            match self.depth {
                ColorDepth::Indexed => tile.image[offset] = index as u8,
                ColorDepth::Rgba => {
                    let [r, g, b] = self.palette.color(index);
                    tile.image[offset..offset + 4].copy_from_slice(&[r, g, b, 255]);
                }
            }
        }

        if column_min < tile.dbfs_min {
            tile.dbfs_min = column_min;
        }
        if column_max > tile.dbfs_max {
            tile.dbfs_max = column_max;
        }

        tile.gauge_min[x] = gauge_byte(column_min, self.range);
        tile.gauge_max[x] = gauge_byte(column_max, self.range);

        // Instantaneous amplitude at the block's temporal midpoint, unwindowed.
        let mid = base + n / 2;
        let (re, im) = (view.sample_i(mid), view.sample_q(mid));
        let amp_db = 5.0 * (re * re + im * im).log10() + self.gain;
        tile.gauge_amp[x] = gauge_byte(amp_db, self.range);

        Ok(())
    }
}
