pub mod buffer;
pub mod filename;
pub mod format;

pub use buffer::{SampleBuffer, SampleView, DEFAULT_SAMPLE_RATE};
pub use filename::{parse_format, parse_freq_rate, FileHints};
pub use format::SampleFormat;
