mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cli::Cli;
use iqgram::render::{ColorDepth, NamedPalette, Orientation, Palette, RenderInfo, RenderParams};
use iqgram::samples::{parse_format, parse_freq_rate, SampleBuffer, SampleFormat};
use iqgram::{SpectrogramEngine, SpectrogramResult, WindowKind};

#[derive(Serialize)]
struct Stats<'a> {
    input: String,
    format: String,
    sample_rate: f64,
    center_freq: f64,
    info: &'a RenderInfo,
    #[serde(flatten)]
    result: &'a SpectrogramResult,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.fft_size == config::default_fft_size() { cli.fft_size = cfg.render.fft_size; }
            if cli.window == config::default_window() { cli.window = cfg.render.window; }
            if cli.gain == config::default_gain() { cli.gain = cfg.render.gain; }
            if cli.range == config::default_range() { cli.range = cfg.render.range; }
            if cli.palette == config::default_palette() { cli.palette = cfg.render.palette; }
            if cli.width == config::default_width() { cli.width = cfg.render.width; }
            if cli.workers == 0 { cli.workers = cfg.render.workers; }
            cli.waterfall |= cfg.render.waterfall;
            cli.indexed |= cfg.render.indexed;
            cli.dual_channel |= cfg.render.dual_channel;
            if cli.format.is_none() { cli.format = cfg.input.format; }
            if cli.sample_rate.is_none() { cli.sample_rate = cfg.input.sample_rate; }
            if cli.center_freq.is_none() { cli.center_freq = cfg.input.center_freq; }
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.list_palettes {
        println!("Available palettes:");
        for palette in NamedPalette::ALL {
            println!("  {:<12} {}", palette.name(), palette.description());
        }
        return Ok(());
    }

    if cli.list_formats {
        println!("Sample formats:");
        for format in SampleFormat::ALL {
            if !format.is_audio() {
                println!("  {:<6} {} bytes per sample", format.tag(), format.sample_width());
            }
        }
        println!("Audio containers: {}", SampleFormat::AUDIO_TAGS.join(" "));
        return Ok(());
    }

    if cli.inputs.is_empty() {
        anyhow::bail!("At least one input capture is required");
    }

    let window: WindowKind = cli.window.parse()?;
    let palette: Palette = cli.palette.parse::<NamedPalette>()?.into();
    let params = RenderParams {
        fft_size: cli.fft_size,
        window,
        gain: cli.gain,
        range: cli.range,
        palette,
        width: cli.width,
        tiles: cli.tiles,
        orientation: if cli.waterfall { Orientation::Waterfall } else { Orientation::Spectrogram },
        depth: if cli.indexed { ColorDepth::Indexed } else { ColorDepth::Rgba },
        dual_channel: cli.dual_channel,
    };
    params.validate()?;

    let engine = SpectrogramEngine::new(cli.workers)?;
    log::info!(
        "iqgram - n={} {:?} gain {} dB range {} dB, {} columns on {} workers",
        params.fft_size,
        params.window,
        params.gain,
        params.range,
        params.width,
        engine.workers()
    );

    let several = cli.inputs.len() > 1;
    let pb = ProgressBar::new(cli.inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} captures ({eta} remaining)")
            .context("Invalid progress bar template")?,
    );
    if !several {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    for input in &cli.inputs {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
        let name = input.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let bytes = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;

        let format = SampleFormat::resolve(cli.format.as_deref().unwrap_or(&parse_format(name)));
        let hints = parse_freq_rate(name);
        let sample_rate = cli.sample_rate.or(hints.sample_rate);
        let center_freq = cli.center_freq.or(hints.center_freq);
        let extension = input.extension().and_then(|e| e.to_str());
        let buffer = SampleBuffer::decode(format, &bytes, extension, sample_rate, center_freq)
            .with_context(|| format!("Failed to load {}", input.display()))?;
        log::info!(
            "{}: {} samples of {} at {} Hz",
            name,
            buffer.sample_count(),
            buffer.format(),
            buffer.sample_rate()
        );

        let started = Instant::now();
        let result = engine
            .render(&buffer, &params)
            .with_context(|| format!("Failed to render {}", input.display()))?;
        log::info!(
            "Rendered {}x{} in {:.1} ms, dBFS {:.1} to {:.1}",
            result.width,
            result.height,
            started.elapsed().as_secs_f64() * 1000.0,
            result.dbfs_min,
            result.dbfs_max
        );

        let info = RenderInfo::new(Some(name), &buffer, &result);
        if cli.info {
            pb.suspend(|| print!("{}", info));
        }

        let output = output_path(&cli.output, input, several);
        write_png(&result, &output)?;
        log::info!("Wrote {}", output.display());

        if let Some(stats) = &cli.stats {
            let stats_path = output_path(stats, input, several);
            let summary = Stats {
                input: input.display().to_string(),
                format: buffer.format().to_string(),
                sample_rate: buffer.sample_rate(),
                center_freq: buffer.center_freq(),
                info: &info,
                result: &result,
            };
            let file = std::fs::File::create(&stats_path)
                .with_context(|| format!("Failed to create {}", stats_path.display()))?;
            serde_json::to_writer_pretty(file, &summary)
                .with_context(|| format!("Failed to write {}", stats_path.display()))?;
        }

        pb.inc(1);
    }

    pb.finish_with_message("Rendering complete");
    Ok(())
}

/// With several inputs, `out.png` becomes `out-<input stem>.png`.
fn output_path(base: &Path, input: &Path, several: bool) -> PathBuf {
    if !several {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let input_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("input");
    let file = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}-{}.{}", stem, input_stem, ext),
        None => format!("{}-{}", stem, input_stem),
    };
    base.with_file_name(file)
}

fn write_png(result: &SpectrogramResult, path: &Path) -> Result<()> {
    let (width, height) = (result.width as u32, result.height as u32);
    match result.depth {
        ColorDepth::Rgba => image::RgbaImage::from_raw(width, height, result.image.clone())
            .context("Image buffer does not match its dimensions")?
            .save_with_format(path, image::ImageFormat::Png),
        ColorDepth::Indexed => image::GrayImage::from_raw(width, height, result.image.clone())
            .context("Image buffer does not match its dimensions")?
            .save_with_format(path, image::ImageFormat::Png),
    }
    .with_context(|| format!("Failed to write {}", path.display()))
}
