use std::borrow::Cow;
use std::ops::Range;

use crate::audio::{AudioDecoder, SymphoniaDecoder};
use crate::error::{Error, Result};

use super::format::SampleFormat;

pub const DEFAULT_SAMPLE_RATE: f64 = 250_000.0;

/// A complete I/Q capture: raw bytes interpreted under one [`SampleFormat`].
#[derive(Clone, Debug)]
pub struct SampleBuffer<'a> {
    bytes: Cow<'a, [u8]>,
    format: SampleFormat,
    sample_rate: f64,
    center_freq: f64,
}

impl<'a> SampleBuffer<'a> {
    /// Wraps already-raw bytes. `SampleFormat::Audio` expects interleaved
    /// `f32` pairs here; containers go through [`SampleBuffer::decode`].
    pub fn new(
        format: SampleFormat,
        bytes: impl Into<Cow<'a, [u8]>>,
        sample_rate: Option<f64>,
        center_freq: Option<f64>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            format,
            sample_rate: sample_rate.filter(|r| *r > 0.0).unwrap_or(DEFAULT_SAMPLE_RATE),
            center_freq: center_freq.unwrap_or(0.0),
        }
    }

    /// Builds a buffer from file contents, running audio containers through
    /// the default symphonia decoder.
    pub fn decode(
        format: SampleFormat,
        bytes: &'a [u8],
        hint: Option<&str>,
        sample_rate: Option<f64>,
        center_freq: Option<f64>,
    ) -> Result<Self> {
        Self::decode_with(&SymphoniaDecoder, format, bytes, hint, sample_rate, center_freq)
    }

    /// Like [`SampleBuffer::decode`] with a caller-supplied audio decoder.
    ///
    /// Audio containers carry their own sample rate, which takes precedence
    /// over `sample_rate`.
    pub fn decode_with(
        decoder: &dyn AudioDecoder,
        format: SampleFormat,
        bytes: &'a [u8],
        hint: Option<&str>,
        sample_rate: Option<f64>,
        center_freq: Option<f64>,
    ) -> Result<Self> {
        if !format.is_audio() {
            return Ok(Self::new(format, bytes, sample_rate, center_freq));
        }

        let audio = decoder.decode(bytes, hint)?;
        if audio.channels.len() != 2 {
            return Err(Error::AudioFormat(audio.channels.len()));
        }
        if let Some(requested) = sample_rate.filter(|r| *r != audio.sample_rate as f64) {
            log::debug!(
                "Ignoring sample rate {} Hz, the container says {} Hz",
                requested,
                audio.sample_rate
            );
        }
        let (left, right) = (&audio.channels[0], &audio.channels[1]);
        let frames = left.len().min(right.len());
        let mut interleaved = Vec::with_capacity(frames * SampleFormat::Audio.sample_width());
        for (l, r) in left.iter().zip(right.iter()) {
            interleaved.extend_from_slice(&l.to_le_bytes());
            interleaved.extend_from_slice(&r.to_le_bytes());
        }

        Ok(Self::new(
            SampleFormat::Audio,
            interleaved,
            Some(audio.sample_rate as f64),
            center_freq,
        ))
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn center_freq(&self) -> f64 {
        self.center_freq
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn sample_width(&self) -> usize {
        self.format.sample_width()
    }

    pub fn sample_count(&self) -> usize {
        self.bytes.len() / self.format.sample_width()
    }

    /// Capture length in seconds.
    pub fn duration(&self) -> f64 {
        self.sample_count() as f64 / self.sample_rate
    }

    pub fn sample_i(&self, pos: usize) -> f64 {
        self.format.sample_i(&self.bytes, pos)
    }

    pub fn sample_q(&self, pos: usize) -> f64 {
        self.format.sample_q(&self.bytes, pos)
    }

    /// Byte range of slice `index` when `[start, end)` is cut into `count`
    /// equal sample-aligned slices. The last slice absorbs the remainder.
    pub fn slice_range(&self, index: usize, count: usize, start: usize, end: usize) -> Range<usize> {
        let width = self.sample_width();
        let count = count.max(1);
        let end = end.min(self.sample_count());
        let start = start.min(end);
        let slice_len = width * ((end - start) / count);
        let base = start * width;
        let lo = base + slice_len * index.min(count);
        let hi = if index + 1 >= count { end * width } else { lo + slice_len };
        lo..hi.max(lo)
    }

    /// Bytes of slice `index` out of `count` over the samples `[start, end)`.
    pub fn slice(&self, index: usize, count: usize, start: usize, end: usize) -> &[u8] {
        &self.bytes[self.slice_range(index, count, start, end)]
    }

    /// Borrows the samples `[start, end)` as a read-only view.
    pub fn view(&self, start: usize, end: usize) -> Result<SampleView<'_>> {
        let available = self.sample_count();
        if start > end || end > available {
            return Err(Error::BufferUnderrun { start, end, available });
        }
        let width = self.sample_width();
        Ok(SampleView {
            bytes: &self.bytes[start * width..end * width],
            format: self.format,
            offset: start,
        })
    }

    /// Power envelope `(127 - I)^2 + (127 - Q)^2` of a CU8 capture.
    pub fn amplitude_cu8(&self) -> Result<Vec<u16>> {
        self.require(SampleFormat::Cu8, "amplitude")?;
        Ok(self
            .bytes
            .chunks_exact(2)
            .map(|iq| {
                let x = 127 - iq[0] as i32;
                let y = 127 - iq[1] as i32;
                (x * x + y * y) as u16
            })
            .collect())
    }

    /// Magnitude estimate `(122 * max + 51 * min) / 128`-style for CU8 and CS16.
    ///
    /// Emphasises quiet signals compared to the true magnitude.
    pub fn magnitude_est(&self) -> Result<Vec<u16>> {
        let estimate = |x: i32, y: i32| {
            let (mi, mx) = if x < y { (x, y) } else { (y, x) };
            122 * mx + 51 * mi
        };
        match self.format {
            SampleFormat::Cu8 => Ok(self
                .bytes
                .chunks_exact(2)
                .map(|iq| {
                    let x = (iq[0] as i32 - 128).abs();
                    let y = (iq[1] as i32 - 128).abs();
                    estimate(x, y) as u16
                })
                .collect()),
            SampleFormat::Cs16 => Ok(self
                .cs16_pairs()
                .map(|(x, y)| (estimate(x.abs(), y.abs()) >> 8) as u16)
                .collect()),
            other => Err(unsupported_helper("magnitude estimate", other)),
        }
    }

    /// Exact magnitude, scaled by 128 for CU8 and halved for CS16.
    pub fn magnitude_true(&self) -> Result<Vec<u16>> {
        match self.format {
            SampleFormat::Cu8 => Ok(self
                .bytes
                .chunks_exact(2)
                .map(|iq| {
                    let x = (iq[0] as i32 - 128) as f64;
                    let y = (iq[1] as i32 - 128) as f64;
                    ((x * x + y * y).sqrt() * 128.0) as u16
                })
                .collect()),
            SampleFormat::Cs16 => Ok(self
                .cs16_pairs()
                .map(|(x, y)| {
                    let (x, y) = (x as f64, y as f64);
                    ((x * x + y * y).sqrt() as u32 >> 1) as u16
                })
                .collect()),
            other => Err(unsupported_helper("true magnitude", other)),
        }
    }

    fn cs16_pairs(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.bytes.chunks_exact(4).map(|iq| {
            (
                i16::from_le_bytes([iq[0], iq[1]]) as i32,
                i16::from_le_bytes([iq[2], iq[3]]) as i32,
            )
        })
    }

    fn require(&self, format: SampleFormat, what: &str) -> Result<()> {
        if self.format == format {
            Ok(())
        } else {
            Err(unsupported_helper(what, self.format))
        }
    }
}

fn unsupported_helper(what: &str, format: SampleFormat) -> Error {
    Error::InvalidParameter(format!("{} is not available for {} samples", what, format))
}

/// Read-only window onto a contiguous sample range of a [`SampleBuffer`].
///
/// Positions stay absolute: `sample_i(pos)` addresses the same sample as the
/// parent buffer would.
#[derive(Clone, Copy, Debug)]
pub struct SampleView<'a> {
    bytes: &'a [u8],
    format: SampleFormat,
    offset: usize,
}

impl<'a> SampleView<'a> {
    /// Absolute index of the first sample in the view.
    pub fn start(&self) -> usize {
        self.offset
    }

    /// Absolute index one past the last sample in the view.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / self.format.sample_width()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sample_i(&self, pos: usize) -> f64 {
        self.format.sample_i(self.bytes, pos - self.offset)
    }

    pub fn sample_q(&self, pos: usize) -> f64 {
        self.format.sample_q(self.bytes, pos - self.offset)
    }
}
