use serde::Serialize;

/// Buckets of the dB histogram, 0.1 dB each, covering 0 to -100 dB.
pub const DB_HISTOGRAM_BUCKETS: usize = 1000;

/// Starting values of the running extrema; the first real bin replaces them.
pub(crate) const DBFS_MIN_START: f64 = 0.0;
pub(crate) const DBFS_MAX_START: f64 = -200.0;

/// How (time, frequency) maps onto image (column, row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Time runs left to right, zero frequency on the centre row.
    #[default]
    Spectrogram,
    /// Transposed: time runs down the rows, frequency across.
    Waterfall,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorDepth {
    /// Four bytes per pixel, RGBA with opaque alpha.
    #[default]
    Rgba,
    /// One byte per pixel holding the palette index.
    Indexed,
}

impl ColorDepth {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorDepth::Rgba => 4,
            ColorDepth::Indexed => 1,
        }
    }
}

/// Output of one column-range tile before merging.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTileResult {
    /// First output column covered by this tile.
    pub offset: usize,
    /// Number of columns in the tile.
    pub columns: usize,
    /// Transform size, i.e. frequency rows.
    pub fft_size: usize,
    pub orientation: Orientation,
    pub depth: ColorDepth,
    /// Tile-local image, `columns * fft_size` pixels.
    pub image: Vec<u8>,
    pub gauge_min: Vec<u8>,
    pub gauge_max: Vec<u8>,
    pub gauge_amp: Vec<u8>,
    pub db_histogram: Vec<u64>,
    pub color_histogram: Vec<u64>,
    pub dbfs_min: f64,
    pub dbfs_max: f64,
}

impl RenderTileResult {
    pub fn new(
        offset: usize,
        columns: usize,
        fft_size: usize,
        palette_len: usize,
        orientation: Orientation,
        depth: ColorDepth,
    ) -> Self {
        Self {
            offset,
            columns,
            fft_size,
            orientation,
            depth,
            image: vec![0; columns * fft_size * depth.bytes_per_pixel()],
            gauge_min: vec![0; columns],
            gauge_max: vec![0; columns],
            gauge_amp: vec![0; columns],
            db_histogram: vec![0; DB_HISTOGRAM_BUCKETS],
            color_histogram: vec![0; palette_len],
            dbfs_min: DBFS_MIN_START,
            dbfs_max: DBFS_MAX_START,
        }
    }
}

/// The merged render: the only artefact handed to presentation code.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpectrogramResult {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Number of rendered columns (time steps).
    pub columns: usize,
    pub fft_size: usize,
    pub orientation: Orientation,
    pub depth: ColorDepth,
    #[serde(skip)]
    pub image: Vec<u8>,
    pub gauge_min: Vec<u8>,
    pub gauge_max: Vec<u8>,
    pub gauge_amp: Vec<u8>,
    pub db_histogram: Vec<u64>,
    pub color_histogram: Vec<u64>,
    pub dbfs_min: f64,
    pub dbfs_max: f64,
    /// Fractional samples between column starts.
    pub stride: f64,
}

impl SpectrogramResult {
    pub fn bytes_per_pixel(&self) -> usize {
        self.depth.bytes_per_pixel()
    }

    /// Bytes of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let bpp = self.bytes_per_pixel();
        let i = (y * self.width + x) * bpp;
        &self.image[i..i + bpp]
    }
}
