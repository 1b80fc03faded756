use std::sync::Arc;

use crate::dsp::FftCache;
use crate::error::{Error, Result};
use crate::samples::SampleBuffer;

use super::column::ColumnRenderer;
use super::params::RenderParams;
use super::pool::{InFlight, WorkerPool};
use super::result::SpectrogramResult;
use super::tile::{stride, TileCoordinator};

type Outcome = Result<Arc<SpectrogramResult>>;

/// Renders spectrograms on a private worker pool, one render at a time.
pub struct SpectrogramEngine {
    pool: WorkerPool,
    ffts: FftCache,
    in_flight: InFlight<Outcome>,
}

impl SpectrogramEngine {
    /// `workers == 0` picks the hardware parallelism (at least two).
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            pool: WorkerPool::new(workers)?,
            ffts: FftCache::new(),
            in_flight: InFlight::new(),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// Renders `buffer` under `params`.
    ///
    /// A call made while another render is running does not start a second
    /// one: it waits and returns that render's result.
    pub fn render(&self, buffer: &SampleBuffer<'_>, params: &RenderParams) -> Outcome {
        self.in_flight
            .run_or_join(|| self.render_now(buffer, params).map(Arc::new))
            .unwrap_or_else(|| Err(Error::Pool("render in flight was aborted".into())))
    }

    fn render_now(
        &self,
        buffer: &SampleBuffer<'_>,
        params: &RenderParams,
    ) -> Result<SpectrogramResult> {
        params.validate()?;
        let n = params.fft_size;
        // Reject captures shorter than one block before any tables are built.
        stride(buffer.sample_count(), n, params.width)?;
        let renderer = ColumnRenderer::new(
            self.ffts.get(n)?,
            params.window.coefficients(n)?,
            &params.palette,
            params.gain,
            params.range,
            params.orientation,
            params.depth,
            params.dual_channel,
        );
        let coordinator = TileCoordinator::new(&renderer, buffer, params.width)?;
        coordinator.render_on(&self.pool, params.tile_count(self.workers()))
    }
}
