use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const TWO_POW_31: f64 = 2147483648.0;
const TWO_POW_64: f64 = 18446744073709551616.0;

/// Wire format of an interleaved I/Q capture.
///
/// Every variant fixes its storage width, bias and scale; decoding a sample
/// depends on nothing but the tag and the bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// 4-bit unsigned, I in the high nibble and Q in the low nibble.
    Cu4,
    /// 4-bit signed, same nibble layout as `Cu4`.
    Cs4,
    #[default]
    Cu8,
    Cs8,
    /// 12-bit unsigned, one I/Q pair packed into three bytes (`iiqIQQ`).
    Cu12,
    /// 12-bit signed, same packing as `Cu12`.
    Cs12,
    Cu16,
    Cs16,
    Cu32,
    Cs32,
    /// 64-bit unsigned, decoded lossily as `high / 2^31 + low / 2^64`.
    Cu64,
    /// 64-bit signed, decoded lossily as `high / 2^31 + low / 2^64`.
    Cs64,
    Cf32,
    Cf64,
    /// Audio container whose two decoded channels act as I and Q.
    ///
    /// Once decoded the buffer holds interleaved little-endian `f32` pairs.
    Audio,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 15] = [
        SampleFormat::Cu4,
        SampleFormat::Cs4,
        SampleFormat::Cu8,
        SampleFormat::Cs8,
        SampleFormat::Cu12,
        SampleFormat::Cs12,
        SampleFormat::Cu16,
        SampleFormat::Cs16,
        SampleFormat::Cu32,
        SampleFormat::Cs32,
        SampleFormat::Cu64,
        SampleFormat::Cs64,
        SampleFormat::Cf32,
        SampleFormat::Cf64,
        SampleFormat::Audio,
    ];

    /// Container extensions handed to the audio decoder instead of being read raw.
    pub const AUDIO_TAGS: [&'static str; 10] = [
        "WAV", "BWF", "WEBM", "OGG", "OPUS", "FLAC", "MP4", "M4A", "AAC", "MP3",
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SampleFormat::Cu4 => "CU4",
            SampleFormat::Cs4 => "CS4",
            SampleFormat::Cu8 => "CU8",
            SampleFormat::Cs8 => "CS8",
            SampleFormat::Cu12 => "CU12",
            SampleFormat::Cs12 => "CS12",
            SampleFormat::Cu16 => "CU16",
            SampleFormat::Cs16 => "CS16",
            SampleFormat::Cu32 => "CU32",
            SampleFormat::Cs32 => "CS32",
            SampleFormat::Cu64 => "CU64",
            SampleFormat::Cs64 => "CS64",
            SampleFormat::Cf32 => "CF32",
            SampleFormat::Cf64 => "CF64",
            SampleFormat::Audio => "AUDIO",
        }
    }

    /// Bytes of storage consumed by one complex sample.
    pub fn sample_width(self) -> usize {
        match self {
            SampleFormat::Cu4 | SampleFormat::Cs4 => 1,
            SampleFormat::Cu8 | SampleFormat::Cs8 => 2,
            SampleFormat::Cu12 | SampleFormat::Cs12 => 3,
            SampleFormat::Cu16 | SampleFormat::Cs16 => 4,
            SampleFormat::Cu32 | SampleFormat::Cs32 => 8,
            SampleFormat::Cf32 | SampleFormat::Audio => 8,
            SampleFormat::Cu64 | SampleFormat::Cs64 | SampleFormat::Cf64 => 16,
        }
    }

    /// Width of one stored element; packed formats report their carrier byte.
    pub fn element_width(self) -> usize {
        match self {
            SampleFormat::Cu4
            | SampleFormat::Cs4
            | SampleFormat::Cu8
            | SampleFormat::Cs8
            | SampleFormat::Cu12
            | SampleFormat::Cs12 => 1,
            SampleFormat::Cu16 | SampleFormat::Cs16 => 2,
            SampleFormat::Cu32
            | SampleFormat::Cs32
            | SampleFormat::Cu64
            | SampleFormat::Cs64
            | SampleFormat::Cf32
            | SampleFormat::Audio => 4,
            SampleFormat::Cf64 => 8,
        }
    }

    /// Value subtracted from the raw element before scaling.
    pub fn bias(self) -> f64 {
        match self {
            SampleFormat::Cu4 => 7.5,
            SampleFormat::Cu8 => 127.5,
            SampleFormat::Cu12 => 2047.5,
            SampleFormat::Cu16 => 32767.5,
            SampleFormat::Cu32 => 2147483647.5,
            SampleFormat::Cu64 => 1.0,
            _ => 0.0,
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            SampleFormat::Cu4 => 1.0 / 7.5,
            SampleFormat::Cs4 => 1.0 / 8.0,
            SampleFormat::Cu8 => 1.0 / 127.5,
            SampleFormat::Cs8 => 1.0 / 128.0,
            SampleFormat::Cu12 => 1.0 / 2047.5,
            SampleFormat::Cs12 => 1.0 / 2048.0,
            SampleFormat::Cu16 | SampleFormat::Cs16 => 1.0 / 32768.0,
            SampleFormat::Cu32 | SampleFormat::Cs32 => 1.0 / TWO_POW_31,
            _ => 1.0,
        }
    }

    pub fn is_audio(self) -> bool {
        self == SampleFormat::Audio
    }

    /// Parses a tag, falling back to `Cu8` when it is not recognised.
    ///
    /// The fallback is logged; use [`str::parse`] to observe it as an error.
    pub fn resolve(tag: &str) -> SampleFormat {
        match tag.parse() {
            Ok(format) => format,
            Err(err) => {
                log::warn!("{}, reading as {}", err, SampleFormat::default());
                SampleFormat::default()
            }
        }
    }

    /// In-phase component of the sample at `pos`.
    ///
    /// Panics if `pos` is not below `bytes.len() / self.sample_width()`.
    pub fn sample_i(self, bytes: &[u8], pos: usize) -> f64 {
        let w = self.sample_width();
        match self {
            SampleFormat::Cu4 => {
                let s = (bytes[pos] & 0xf0) >> 4;
                (s as f64 - self.bias()) * self.scale()
            }
            SampleFormat::Cs4 => {
                let s = (bytes[pos] as i8) >> 4;
                s as f64 * self.scale()
            }
            SampleFormat::Cu12 => {
                let (b0, b1) = (bytes[w * pos] as u32, bytes[w * pos + 1] as u32);
                let s = ((b1 & 0x0f) << 8) | b0;
                (s as f64 - self.bias()) * self.scale()
            }
            SampleFormat::Cs12 => {
                let (b0, b1) = (bytes[w * pos] as u32, bytes[w * pos + 1] as u32);
                let s = (((b1 & 0x0f) << 28) | (b0 << 20)) as i32 >> 20;
                s as f64 * self.scale()
            }
            SampleFormat::Cu64 | SampleFormat::Cs64 => self.wide(bytes, w * pos),
            _ => self.element(bytes, w * pos),
        }
    }

    /// Quadrature component of the sample at `pos`.
    ///
    /// Panics if `pos` is not below `bytes.len() / self.sample_width()`.
    pub fn sample_q(self, bytes: &[u8], pos: usize) -> f64 {
        let w = self.sample_width();
        match self {
            SampleFormat::Cu4 => {
                let s = bytes[pos] & 0x0f;
                (s as f64 - self.bias()) * self.scale()
            }
            SampleFormat::Cs4 => {
                let s = ((bytes[pos] << 4) as i8) >> 4;
                s as f64 * self.scale()
            }
            SampleFormat::Cu12 => {
                let (b1, b2) = (bytes[w * pos + 1] as u32, bytes[w * pos + 2] as u32);
                let s = (b2 << 4) | ((b1 & 0xf0) >> 4);
                (s as f64 - self.bias()) * self.scale()
            }
            SampleFormat::Cs12 => {
                let (b1, b2) = (bytes[w * pos + 1] as u32, bytes[w * pos + 2] as u32);
                let s = ((b2 << 24) | ((b1 & 0xf0) << 16)) as i32 >> 20;
                s as f64 * self.scale()
            }
            SampleFormat::Cu64 | SampleFormat::Cs64 => self.wide(bytes, w * pos + 8),
            _ => self.element(bytes, w * pos + self.element_width()),
        }
    }

    /// Reads one native element at `offset` and applies bias and scale.
    fn element(self, bytes: &[u8], offset: usize) -> f64 {
        let raw = match self {
            SampleFormat::Cs8 => bytes[offset] as i8 as f64,
            SampleFormat::Cu16 => u16::from_le_bytes(le(bytes, offset)) as f64,
            SampleFormat::Cs16 => i16::from_le_bytes(le(bytes, offset)) as f64,
            SampleFormat::Cu32 => u32::from_le_bytes(le(bytes, offset)) as f64,
            SampleFormat::Cs32 => i32::from_le_bytes(le(bytes, offset)) as f64,
            SampleFormat::Cf32 | SampleFormat::Audio => {
                f32::from_le_bytes(le(bytes, offset)) as f64
            }
            SampleFormat::Cf64 => f64::from_le_bytes(le(bytes, offset)),
            _ => bytes[offset] as f64,
        };
        (raw - self.bias()) * self.scale()
    }

    /// Approximates an 8-byte integer from its two little-endian words.
    ///
    /// Only about 53 bits survive; this is the documented lossy decoding.
    fn wide(self, bytes: &[u8], offset: usize) -> f64 {
        let low = u32::from_le_bytes(le(bytes, offset)) as f64;
        let high_word: [u8; 4] = le(bytes, offset + 4);
        let high = if self == SampleFormat::Cs64 {
            i32::from_le_bytes(high_word) as f64
        } else {
            u32::from_le_bytes(high_word) as f64
        };
        high / TWO_POW_31 + low / TWO_POW_64 - self.bias()
    }
}

fn le<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let upper = tag.trim().to_uppercase();
        let format = match upper.as_str() {
            "CU4" => SampleFormat::Cu4,
            "CS4" => SampleFormat::Cs4,
            "CU8" | "DATA" | "COMPLEX16U" => SampleFormat::Cu8,
            "CS8" | "COMPLEX16S" => SampleFormat::Cs8,
            "CU12" => SampleFormat::Cu12,
            "CS12" => SampleFormat::Cs12,
            "CU16" => SampleFormat::Cu16,
            "CS16" => SampleFormat::Cs16,
            "CU32" => SampleFormat::Cu32,
            "CS32" => SampleFormat::Cs32,
            "CU64" => SampleFormat::Cu64,
            "CS64" => SampleFormat::Cs64,
            "CF32" | "CFILE" | "COMPLEX" => SampleFormat::Cf32,
            "CF64" => SampleFormat::Cf64,
            "AUDIO" => SampleFormat::Audio,
            other if SampleFormat::AUDIO_TAGS.contains(&other) => SampleFormat::Audio,
            _ => return Err(Error::UnsupportedFormat(tag.to_string())),
        };
        Ok(format)
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_in_unit_range(format: SampleFormat, bytes: &[u8]) {
        let count = bytes.len() / format.sample_width();
        for pos in 0..count {
            for v in [format.sample_i(bytes, pos), format.sample_q(bytes, pos)] {
                assert!(
                    (-1.0 - EPS..=1.0 + EPS).contains(&v),
                    "{format} sample {pos} out of range: {v}"
                );
            }
        }
    }

    #[test]
    fn parses_tags_and_aliases() {
        assert_eq!("cu8".parse::<SampleFormat>(), Ok(SampleFormat::Cu8));
        assert_eq!("DATA".parse::<SampleFormat>(), Ok(SampleFormat::Cu8));
        assert_eq!("complex16s".parse::<SampleFormat>(), Ok(SampleFormat::Cs8));
        assert_eq!("cfile".parse::<SampleFormat>(), Ok(SampleFormat::Cf32));
        assert_eq!("flac".parse::<SampleFormat>(), Ok(SampleFormat::Audio));
        for format in SampleFormat::ALL {
            assert_eq!(format.tag().parse::<SampleFormat>(), Ok(format));
        }
    }

    #[test]
    fn unknown_tag_is_observable_and_resolves_to_cu8() {
        assert_eq!(
            "xyz".parse::<SampleFormat>(),
            Err(Error::UnsupportedFormat("xyz".into()))
        );
        assert_eq!(SampleFormat::resolve("xyz"), SampleFormat::Cu8);
        assert_eq!(SampleFormat::resolve("?"), SampleFormat::Cu8);
    }

    #[test]
    fn nibble_formats_split_one_byte() {
        let bytes = [0xf0u8, 0x0f, 0x87];
        assert!((SampleFormat::Cu4.sample_i(&bytes, 0) - 1.0).abs() < EPS);
        assert!((SampleFormat::Cu4.sample_q(&bytes, 0) + 1.0).abs() < EPS);
        // 0x8 sign-extends to -8, 0x7 stays 7.
        assert_eq!(SampleFormat::Cs4.sample_i(&bytes, 2), -1.0);
        assert_eq!(SampleFormat::Cs4.sample_q(&bytes, 2), 7.0 / 8.0);
        assert_eq!(SampleFormat::Cs4.sample_i(&bytes, 1), 0.0);
        assert_eq!(SampleFormat::Cs4.sample_q(&bytes, 1), -1.0 / 8.0);
    }

    #[test]
    fn twelve_bit_packing() {
        // I = 0xABC, Q = 0x123 packed as iiqIQQ: [0xBC, 0x3A, 0x12].
        let bytes = [0xbcu8, 0x3a, 0x12];
        let i = SampleFormat::Cu12.sample_i(&bytes, 0);
        let q = SampleFormat::Cu12.sample_q(&bytes, 0);
        assert!((i - (0xabc as f64 - 2047.5) / 2047.5).abs() < EPS);
        assert!((q - (0x123 as f64 - 2047.5) / 2047.5).abs() < EPS);

        // 0xABC is negative as a signed 12-bit value.
        let si = SampleFormat::Cs12.sample_i(&bytes, 0);
        let sq = SampleFormat::Cs12.sample_q(&bytes, 0);
        assert_eq!(si, (0xabc as f64 - 4096.0) / 2048.0);
        assert_eq!(sq, 0x123 as f64 / 2048.0);
    }

    #[test]
    fn native_formats_read_little_endian() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-32768i16).to_le_bytes());
        bytes.extend_from_slice(&16384i16.to_le_bytes());
        assert_eq!(SampleFormat::Cs16.sample_i(&bytes, 0), -1.0);
        assert_eq!(SampleFormat::Cs16.sample_q(&bytes, 0), 0.5);

        let mut floats = Vec::new();
        floats.extend_from_slice(&0.25f32.to_le_bytes());
        floats.extend_from_slice(&(-0.75f32).to_le_bytes());
        assert_eq!(SampleFormat::Cf32.sample_i(&floats, 0), 0.25);
        assert_eq!(SampleFormat::Cf32.sample_q(&floats, 0), -0.75);
    }

    #[test]
    fn wide_formats_use_the_lossy_word_combination() {
        let mut bytes = Vec::new();
        // I: low word 0, high word 0x8000_0000 -> 1.0 for CU64 (minus bias 1.0 = 0).
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0x8000_0000u32.to_le_bytes());
        // Q: low word u32::MAX, high word 0 -> (2^32-1)/2^64, a tiny fraction.
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        assert_eq!(SampleFormat::Cu64.sample_i(&bytes, 0), 0.0);
        assert_eq!(SampleFormat::Cs64.sample_i(&bytes, 0), -1.0);
        let q = SampleFormat::Cs64.sample_q(&bytes, 0);
        assert!(q > 0.0 && q < 1e-9);
    }

    #[test]
    fn full_range_inputs_stay_normalised() {
        let all_bytes: Vec<u8> = (0..=255u8).collect();
        for format in [
            SampleFormat::Cu4,
            SampleFormat::Cs4,
            SampleFormat::Cu8,
            SampleFormat::Cs8,
        ] {
            assert_in_unit_range(format, &all_bytes);
        }

        let mut twelve = Vec::new();
        for v in [0u32, 0x7ff, 0x800, 0xfff] {
            twelve.extend_from_slice(&[(v & 0xff) as u8, (((v & 0x0f) << 4) | (v >> 8)) as u8, (v >> 4) as u8]);
        }
        assert_in_unit_range(SampleFormat::Cu12, &twelve);
        assert_in_unit_range(SampleFormat::Cs12, &twelve);

        let mut sixteen = Vec::new();
        for v in [0u16, 1, 0x7fff, 0x8000, 0xffff] {
            sixteen.extend_from_slice(&v.to_le_bytes());
        }
        sixteen.extend_from_slice(&0u16.to_le_bytes());
        assert_in_unit_range(SampleFormat::Cu16, &sixteen);
        assert_in_unit_range(SampleFormat::Cs16, &sixteen);

        let mut thirty_two = Vec::new();
        for v in [0u32, 0x7fff_ffff, 0x8000_0000, u32::MAX] {
            thirty_two.extend_from_slice(&v.to_le_bytes());
        }
        assert_in_unit_range(SampleFormat::Cu32, &thirty_two);
        assert_in_unit_range(SampleFormat::Cs32, &thirty_two);

        let mut sixty_four = Vec::new();
        for v in [0u64, 0x7fff_ffff_ffff_ffff, 0x8000_0000_0000_0000, u64::MAX] {
            sixty_four.extend_from_slice(&v.to_le_bytes());
        }
        // CU64 reaches just below 1.0 + 2^-32 at u64::MAX; within tolerance.
        for format in [SampleFormat::Cu64, SampleFormat::Cs64] {
            let count = sixty_four.len() / format.sample_width();
            for pos in 0..count {
                for v in [format.sample_i(&sixty_four, pos), format.sample_q(&sixty_four, pos)] {
                    assert!((-1.0 - 1e-6..=1.0 + 1e-6).contains(&v), "{format}: {v}");
                }
            }
        }

        let mut floats = Vec::new();
        for v in [-1.0f32, 1.0, 0.0, 0.5] {
            floats.extend_from_slice(&v.to_le_bytes());
        }
        assert_in_unit_range(SampleFormat::Cf32, &floats);
        let mut doubles = Vec::new();
        for v in [-1.0f64, 1.0] {
            doubles.extend_from_slice(&v.to_le_bytes());
        }
        assert_in_unit_range(SampleFormat::Cf64, &doubles);
    }
}
