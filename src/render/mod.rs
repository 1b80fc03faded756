pub mod column;
pub mod engine;
pub mod info;
pub mod palette;
pub mod params;
pub mod pool;
pub mod result;
pub mod tile;

pub use column::ColumnRenderer;
pub use engine::SpectrogramEngine;
pub use info::{autorange, format_si, RenderInfo};
pub use palette::{NamedPalette, Palette};
pub use params::RenderParams;
pub use pool::{default_workers, WorkerPool};
pub use result::{
    ColorDepth, Orientation, RenderTileResult, SpectrogramResult, DB_HISTOGRAM_BUCKETS,
};
pub use tile::{partition, TileCoordinator};
