use std::ops::Range;

use crate::error::{Error, Result};
use crate::samples::SampleBuffer;

use super::column::{column_base, ColumnRenderer, ColumnScratch};
use super::pool::WorkerPool;
use super::result::{
    ColorDepth, Orientation, RenderTileResult, SpectrogramResult, DBFS_MAX_START, DBFS_MIN_START,
    DB_HISTOGRAM_BUCKETS,
};

/// Splits `[0, width)` into `tiles` contiguous ranges of `width / tiles`
/// columns; the last range absorbs the remainder.
pub fn partition(width: usize, tiles: usize) -> Vec<Range<usize>> {
    let tiles = tiles.max(1);
    let step = width / tiles;
    (0..tiles)
        .map(|t| {
            let start = step * t;
            let end = if t + 1 == tiles { width } else { start + step };
            start..end
        })
        .collect()
}

/// Fractional sample distance between consecutive column starts.
///
/// A single column sits at the last valid block start.
pub fn stride(sample_count: usize, n: usize, width: usize) -> Result<f64> {
    if width == 0 {
        return Err(Error::InvalidParameter("output width must be at least 1".into()));
    }
    if sample_count < n {
        return Err(Error::BufferUnderrun { start: 0, end: n, available: sample_count });
    }
    let span = (sample_count - n) as f64;
    Ok(if width == 1 { span } else { span / (width - 1) as f64 })
}

/// Runs the column renderer over column ranges of one buffer and merges the
/// tiles back into a single result.
pub struct TileCoordinator<'a> {
    renderer: &'a ColumnRenderer,
    buffer: &'a SampleBuffer<'a>,
    width: usize,
    stride: f64,
}

impl<'a> TileCoordinator<'a> {
    pub fn new(
        renderer: &'a ColumnRenderer,
        buffer: &'a SampleBuffer<'a>,
        width: usize,
    ) -> Result<Self> {
        let stride = stride(buffer.sample_count(), renderer.fft_size(), width)?;
        log::debug!(
            "{} samples, {} columns, stride {:.3}",
            buffer.sample_count(),
            width,
            stride
        );
        Ok(Self { renderer, buffer, width, stride })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn stride(&self) -> f64 {
        self.stride
    }

    pub fn partition(&self, tiles: usize) -> Vec<Range<usize>> {
        partition(self.width, tiles)
    }

    /// Renders tile `index` covering `columns`. Failures are tagged with the
    /// tile index.
    pub fn render_tile(&self, index: usize, columns: Range<usize>) -> Result<RenderTileResult> {
        self.render_columns(columns)
            .map_err(|source| Error::TileExecution { tile: index, source: Box::new(source) })
    }

    fn render_columns(&self, columns: Range<usize>) -> Result<RenderTileResult> {
        let n = self.renderer.fft_size();
        let mut tile = RenderTileResult::new(
            columns.start,
            columns.len(),
            n,
            self.renderer.palette_len(),
            self.renderer.orientation(),
            self.renderer.depth(),
        );
        if columns.is_empty() {
            return Ok(tile);
        }

        // Only the samples this tile reads are borrowed.
        let first = column_base(self.stride, columns.start);
        let last = column_base(self.stride, columns.end - 1) + n;
        let view = self.buffer.view(first, last)?;

        let mut scratch = ColumnScratch::new(n);
        for (x, column) in columns.enumerate() {
            let base = column_base(self.stride, column);
            self.renderer.render(&view, base, x, &mut tile, &mut scratch)?;
        }
        Ok(tile)
    }

    /// Combines tile results in column order. Images and gauges are copied
    /// into their disjoint ranges, histograms summed, extrema reduced.
    pub fn merge(&self, tiles: Vec<RenderTileResult>) -> Result<SpectrogramResult> {
        let n = self.renderer.fft_size();
        let depth = self.renderer.depth();
        let orientation = self.renderer.orientation();
        let bpp = depth.bytes_per_pixel();
        let w = self.width;

        let (width, height) = match orientation {
            Orientation::Spectrogram => (w, n),
            Orientation::Waterfall => (n, w),
        };
        let mut merged = SpectrogramResult {
            width,
            height,
            columns: w,
            fft_size: n,
            orientation,
            depth,
            image: vec![0; w * n * bpp],
            gauge_min: vec![0; w],
            gauge_max: vec![0; w],
            gauge_amp: vec![0; w],
            db_histogram: vec![0; DB_HISTOGRAM_BUCKETS],
            color_histogram: vec![0; self.renderer.palette_len()],
            dbfs_min: DBFS_MIN_START,
            dbfs_max: DBFS_MAX_START,
            stride: self.stride,
        };

        let mut covered = 0;
        for tile in tiles {
            let (offset, cols) = (tile.offset, tile.columns);
            if (tile.fft_size, tile.orientation, tile.depth) != (n, orientation, depth) {
                return Err(Error::InvalidParameter(format!(
                    "tile at column {} is {:?}/{:?} with n={}, render is {:?}/{:?} with n={}",
                    offset, tile.orientation, tile.depth, tile.fft_size, orientation, depth, n
                )));
            }
            if offset != covered || offset + cols > w {
                return Err(Error::InvalidParameter(format!(
                    "tile at column {} with {} columns does not follow column {}",
                    offset, cols, covered
                )));
            }
            covered += cols;
            if cols == 0 {
                continue;
            }

            match orientation {
                Orientation::Spectrogram => {
                    for y in 0..n {
                        let src = cols * y * bpp;
                        let dst = (offset + w * y) * bpp;
                        merged.image[dst..dst + cols * bpp]
                            .copy_from_slice(&tile.image[src..src + cols * bpp]);
                    }
                }
                Orientation::Waterfall => {
                    // Each tile is a contiguous band of rows.
                    let row = match depth {
                        ColorDepth::Indexed => offset,
                        ColorDepth::Rgba => w - (offset + cols),
                    };
                    let dst = n * row * bpp;
                    merged.image[dst..dst + tile.image.len()].copy_from_slice(&tile.image);
                }
            }

            merged.gauge_min[offset..offset + cols].copy_from_slice(&tile.gauge_min);
            merged.gauge_max[offset..offset + cols].copy_from_slice(&tile.gauge_max);
            merged.gauge_amp[offset..offset + cols].copy_from_slice(&tile.gauge_amp);

            for (acc, v) in merged.db_histogram.iter_mut().zip(&tile.db_histogram) {
                *acc += v;
            }
            for (acc, v) in merged.color_histogram.iter_mut().zip(&tile.color_histogram) {
                *acc += v;
            }

            if tile.dbfs_min < merged.dbfs_min {
                merged.dbfs_min = tile.dbfs_min;
            }
            if tile.dbfs_max > merged.dbfs_max {
                merged.dbfs_max = tile.dbfs_max;
            }
        }

        if covered != w {
            return Err(Error::InvalidParameter(format!(
                "tiles cover {} of {} columns",
                covered, w
            )));
        }
        Ok(merged)
    }

    /// Renders every tile on the calling thread and merges them.
    pub fn render_serial(&self, tiles: usize) -> Result<SpectrogramResult> {
        let results = self
            .partition(tiles)
            .into_iter()
            .enumerate()
            .map(|(index, columns)| self.render_tile(index, columns))
            .collect::<Result<Vec<_>>>()?;
        self.merge(results)
    }

    /// Renders the tiles on `pool` and merges them. If any tile fails the
    /// error of the lowest failing tile is returned and nothing is merged.
    pub fn render_on(&self, pool: &WorkerPool, tiles: usize) -> Result<SpectrogramResult> {
        let ranges = self.partition(tiles);
        let results = pool.run(ranges.len(), |index| {
            self.render_tile(index, ranges[index].clone())
        });
        // Outputs are in tile order.
        let results = results.into_iter().collect::<Result<Vec<_>>>()?;
        self.merge(results)
    }
}
