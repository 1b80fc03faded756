use thiserror::Error;

/// Errors raised by the spectrogram engine.
///
/// `Clone` so a finished render can be handed to every caller that joined it
/// while it was in flight.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The transform size is not a power of two.
    #[error("transform size {0} is not a power of two")]
    InvalidSize(usize),

    /// The format tag is not recognised.
    #[error("unsupported sample format '{0}'")]
    UnsupportedFormat(String),

    /// The audio decoder produced a channel layout other than stereo.
    #[error("audio source has {0} channels, exactly 2 are required")]
    AudioFormat(usize),

    /// The audio decoder failed on the container or codec.
    #[error("audio decode failed: {0}")]
    AudioDecode(String),

    /// A sample range reaches past the end of the buffer.
    #[error("buffer underrun: samples {start}..{end} requested, {available} available")]
    BufferUnderrun {
        start: usize,
        end: usize,
        available: usize,
    },

    /// One tile of a render failed; the whole render is discarded.
    #[error("tile {tile} failed: {source}")]
    TileExecution {
        tile: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid render parameter: {0}")]
    InvalidParameter(String),

    /// A custom window generator returned the wrong number of coefficients.
    #[error("window generator returned {got} coefficients, expected {expected}")]
    WindowLength { expected: usize, got: usize },

    #[error("worker pool: {0}")]
    Pool(String),
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
