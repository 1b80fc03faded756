pub mod decode;

pub use decode::{AudioDecoder, DecodedAudio, SymphoniaDecoder};
