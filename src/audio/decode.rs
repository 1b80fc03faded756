use std::io::{Cursor, ErrorKind};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{Error, Result};

/// Planar result of decoding an audio container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    /// One vector per channel, all of the same length.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }
}

/// Turns an in-memory audio container into planar float channels.
pub trait AudioDecoder: Send + Sync {
    /// `hint` is the container extension when known (e.g. `"wav"`).
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio>;
}

/// [`AudioDecoder`] backed by symphonia's default codec registry.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], hint: Option<&str>) -> Result<DecodedAudio> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut probe_hint = Hint::new();
        if let Some(ext) = hint {
            probe_hint.with_extension(&ext.to_lowercase());
        }

        let probed = symphonia::default::get_probe()
            .format(&probe_hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(decode_error("failed to probe audio format"))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::AudioDecode("no audio tracks found".into()))?;

        let track_id = track.id;
        let channel_count = track.codec_params.channels.map_or(1, |c| c.count());
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| Error::AudioDecode("unknown sample rate".into()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(decode_error("failed to create audio decoder"))?;

        let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    break;
                }
                Err(e) => return Err(decode_error("failed to read packet")(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(decode_error("failed to decode packet")(e)),
            };

            let spec = *decoded.spec();
            let count = spec.channels.count();
            if count != channels.len() {
                channels.resize_with(count, Vec::new);
            }

            let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            for frame in sample_buf.samples().chunks(count) {
                for (channel, &sample) in channels.iter_mut().zip(frame) {
                    channel.push(sample);
                }
            }
        }

        let audio = DecodedAudio { sample_rate, channels };
        log::info!(
            "Decoded audio: {} channels, {} frames, {}Hz, {:.1}s",
            audio.channels.len(),
            audio.frames(),
            sample_rate,
            audio.frames() as f32 / sample_rate as f32
        );
        Ok(audio)
    }
}

fn decode_error(context: &'static str) -> impl Fn(SymphoniaError) -> Error {
    move |e| Error::AudioDecode(format!("{}: {}", context, e))
}
