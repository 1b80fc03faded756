use std::f64::consts::PI;

use iqgram::render::{partition, ColorDepth, Orientation, RenderParams};
use iqgram::{Error, SampleBuffer, SampleFormat, SpectrogramEngine, SpectrogramResult, WindowKind};

/// CU8 capture of a complex tone at `cycles_per_sample` with peak `amplitude`.
fn cu8_tone(samples: usize, cycles_per_sample: f64, amplitude: f64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 * samples);
    for k in 0..samples {
        let phase = 2.0 * PI * cycles_per_sample * k as f64;
        bytes.push((127.5 + 127.5 * amplitude * phase.cos()).round() as u8);
        bytes.push((127.5 + 127.5 * amplitude * phase.sin()).round() as u8);
    }
    bytes
}

fn cf32(pairs: impl Iterator<Item = (f32, f32)>) -> Vec<u8> {
    pairs
        .flat_map(|(i, q)| {
            let mut b = i.to_le_bytes().to_vec();
            b.extend_from_slice(&q.to_le_bytes());
            b
        })
        .collect()
}

fn peak_row(result: &SpectrogramResult, x: usize) -> usize {
    (0..result.height).max_by_key(|&y| result.pixel(x, y)[0]).unwrap_or(0)
}

fn tone_params() -> RenderParams {
    RenderParams {
        fft_size: 256,
        width: 64,
        window: WindowKind::Rectangular,
        gain: 0.0,
        range: 40.0,
        depth: ColorDepth::Indexed,
        ..RenderParams::default()
    }
}

#[test]
fn tone_lands_on_its_folded_bin() {
    let amplitude = 0.5;
    let bytes = cu8_tone(1024, 1.0 / 8.0, amplitude);
    assert_eq!(bytes.len(), 2048);
    let buffer = SampleBuffer::new(SampleFormat::Cu8, bytes, None, None);

    let engine = SpectrogramEngine::new(4).unwrap();
    let params = tone_params();
    let result = engine.render(&buffer, &params).unwrap();

    let n = params.fft_size;
    let expected_row = n / 2 - n / 8;
    for x in 0..result.width {
        let row = peak_row(&result, x);
        assert!(row.abs_diff(expected_row) <= 1, "column {} peaks at row {}", x, row);
    }

    let expected_db = 10.0 * amplitude.log10();
    assert!(
        (result.dbfs_max - expected_db).abs() < 1.0,
        "dBFS max {} expected {}",
        result.dbfs_max,
        expected_db
    );
    assert!(result.dbfs_min < result.dbfs_max);
}

#[test]
fn histograms_count_every_bin_once() {
    let buffer = SampleBuffer::new(SampleFormat::Cu8, cu8_tone(5000, 0.13, 0.7), None, None);
    let engine = SpectrogramEngine::new(3).unwrap();
    for orientation in [Orientation::Spectrogram, Orientation::Waterfall] {
        let params = RenderParams {
            fft_size: 128,
            width: 97,
            orientation,
            ..RenderParams::default()
        };
        let result = engine.render(&buffer, &params).unwrap();
        let bins = (97 * 128) as u64;
        assert_eq!(result.db_histogram.iter().sum::<u64>(), bins);
        assert_eq!(result.color_histogram.iter().sum::<u64>(), bins);
        assert_eq!(result.image.len(), 97 * 128 * 4);
    }
}

#[test]
fn one_tile_and_four_tiles_are_identical() {
    let buffer = SampleBuffer::new(SampleFormat::Cu8, cu8_tone(20_000, 0.031, 0.3), None, None);
    let engine = SpectrogramEngine::new(4).unwrap();
    for (orientation, depth) in [
        (Orientation::Spectrogram, ColorDepth::Rgba),
        (Orientation::Waterfall, ColorDepth::Rgba),
        (Orientation::Waterfall, ColorDepth::Indexed),
    ] {
        let params = RenderParams {
            fft_size: 256,
            width: 513,
            orientation,
            depth,
            ..RenderParams::default()
        };
        let one = engine.render(&buffer, &RenderParams { tiles: 1, ..params.clone() }).unwrap();
        let four = engine.render(&buffer, &RenderParams { tiles: 4, ..params }).unwrap();
        assert_eq!(one.image, four.image);
        assert_eq!(one.gauge_min, four.gauge_min);
        assert_eq!(one.gauge_max, four.gauge_max);
        assert_eq!(one.gauge_amp, four.gauge_amp);
        assert_eq!(one.db_histogram, four.db_histogram);
        assert_eq!(one.color_histogram, four.color_histogram);
        assert_eq!((one.dbfs_min, one.dbfs_max), (four.dbfs_min, four.dbfs_max));
    }
}

#[test]
fn partitions_cover_the_width() {
    for width in [1, 5, 64, 3000] {
        for tiles in [1, 2, 3, 4, 7, 16] {
            let ranges = partition(width, tiles);
            let mut covered = vec![0u8; width];
            for range in ranges {
                for c in range {
                    covered[c] += 1;
                }
            }
            assert!(covered.iter().all(|&c| c == 1), "W={} T={}", width, tiles);
        }
    }
}

#[test]
fn single_column_uses_the_last_block() {
    let buffer = SampleBuffer::new(SampleFormat::Cu8, cu8_tone(1024, 0.125, 0.5), None, None);
    let engine = SpectrogramEngine::new(2).unwrap();
    let result = engine
        .render(&buffer, &RenderParams { width: 1, ..tone_params() })
        .unwrap();
    assert_eq!(result.stride, (1024 - 256) as f64);
    assert!(result.stride.is_finite());
    assert_eq!(result.columns, 1);
    assert_eq!(peak_row(&result, 0), 96);
}

#[test]
fn short_capture_is_an_underrun() {
    let buffer = SampleBuffer::new(SampleFormat::Cu8, vec![128u8; 200], None, None);
    let engine = SpectrogramEngine::new(2).unwrap();
    let err = engine.render(&buffer, &tone_params()).unwrap_err();
    assert_eq!(err, Error::BufferUnderrun { start: 0, end: 256, available: 100 });
}

#[test]
fn dual_channel_separates_left_and_right() {
    let n = 64;
    // Left: cosine at bin 4. Right: silence.
    let pairs = (0..4 * n).map(|k| ((2.0 * PI * 4.0 * k as f64 / n as f64).cos() as f32, 0.0f32));
    let buffer = SampleBuffer::new(SampleFormat::Cf32, cf32(pairs), None, None);
    let engine = SpectrogramEngine::new(2).unwrap();
    let params = RenderParams {
        fft_size: n,
        width: 4,
        window: WindowKind::Rectangular,
        gain: 0.0,
        range: 40.0,
        depth: ColorDepth::Indexed,
        dual_channel: true,
        ..RenderParams::default()
    };
    let result = engine.render(&buffer, &params).unwrap();
    for x in 0..4 {
        assert_eq!(peak_row(&result, x), n / 2 - 4);
        // Second-channel rows stay at the bottom of the palette.
        for y in n / 2 + 1..n {
            assert_eq!(result.pixel(x, y)[0], 0, "column {} row {}", x, y);
        }
    }
}

#[test]
fn gauges_follow_the_signal_level() {
    let loud = SampleBuffer::new(SampleFormat::Cu8, cu8_tone(4096, 0.125, 0.9), None, None);
    let quiet = SampleBuffer::new(SampleFormat::Cu8, cu8_tone(4096, 0.125, 0.05), None, None);
    let engine = SpectrogramEngine::new(2).unwrap();
    let params = RenderParams { width: 16, ..tone_params() };
    let loud = engine.render(&loud, &params).unwrap();
    let quiet = engine.render(&quiet, &params).unwrap();
    for x in 0..16 {
        assert!(loud.gauge_max[x] > quiet.gauge_max[x]);
        assert!(loud.gauge_amp[x] > quiet.gauge_amp[x]);
    }
}
