use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "iqgram", about = "Spectrogram renderer for I/Q captures and stereo audio")]
pub struct Cli {
    /// Input captures (.cu8, .cs16, .cf32, ... or WAV/FLAC/OGG/MP3)
    pub inputs: Vec<PathBuf>,

    /// Output PNG file. With several inputs, the input stem is appended.
    #[arg(short, long, default_value = "spectrogram.png")]
    pub output: PathBuf,

    /// Write a JSON summary (gauges, histograms, dBFS range) to this path
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Config file (default: ./iqgram.toml, then ~/.config/iqgram/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sample format override. Otherwise taken from the file extension.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Sample rate in Hz. Otherwise taken from the file name, or 250k.
    /// Audio containers always use their own rate.
    #[arg(short = 'r', long)]
    pub sample_rate: Option<f64>,

    /// Center frequency in Hz. Otherwise taken from the file name.
    #[arg(long)]
    pub center_freq: Option<f64>,

    /// FFT size (power of two)
    #[arg(short = 'n', long, default_value_t = 512)]
    pub fft_size: usize,

    /// Window function
    #[arg(short, long, default_value = "blackman-harris")]
    pub window: String,

    /// Gain in dB
    #[arg(short, long, default_value_t = 6.0, allow_negative_numbers = true)]
    pub gain: f64,

    /// Dynamic range in dB
    #[arg(long, default_value_t = 30.0)]
    pub range: f64,

    /// Palette name
    #[arg(short, long, default_value = "sox")]
    pub palette: String,

    /// Output width in columns
    #[arg(long, default_value_t = 3000)]
    pub width: usize,

    /// Worker threads (0 = hardware parallelism, at least 2)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub workers: usize,

    /// Column tiles per render (0 = one per worker)
    #[arg(long, default_value_t = 0)]
    pub tiles: usize,

    /// Render a waterfall (time runs down) instead of a spectrogram
    #[arg(long)]
    pub waterfall: bool,

    /// Write palette indices as a greyscale image instead of colours
    #[arg(long)]
    pub indexed: bool,

    /// Treat I and Q as two independent real channels
    #[arg(long)]
    pub dual_channel: bool,

    /// Print capture and render info
    #[arg(long)]
    pub info: bool,

    /// List built-in palettes and exit
    #[arg(long)]
    pub list_palettes: bool,

    /// List sample formats and exit
    #[arg(long)]
    pub list_formats: bool,
}
