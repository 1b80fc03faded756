pub mod fft;
pub mod window;

pub use fft::{Fft, FftCache};
pub use window::{WindowCoefficients, WindowGenerator, WindowKind};
