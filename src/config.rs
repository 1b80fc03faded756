use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_window")]
    pub window: String,
    #[serde(default = "default_gain")]
    pub gain: f64,
    #[serde(default = "default_range")]
    pub range: f64,
    #[serde(default = "default_palette")]
    pub palette: String,
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub waterfall: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub dual_channel: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    pub format: Option<String>,
    pub sample_rate: Option<f64>,
    pub center_freq: Option<f64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            window: default_window(),
            gain: default_gain(),
            range: default_range(),
            palette: default_palette(),
            width: default_width(),
            workers: 0,
            waterfall: false,
            indexed: false,
            dual_channel: false,
        }
    }
}

pub fn default_fft_size() -> usize { 512 }
pub fn default_window() -> String { "blackman-harris".into() }
pub fn default_gain() -> f64 { 6.0 }
pub fn default_range() -> f64 { 30.0 }
pub fn default_palette() -> String { "sox".into() }
pub fn default_width() -> usize { 3000 }

/// Explicit path, else `./iqgram.toml`, else the per-user config files.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("iqgram.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("iqgram").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("iqgram").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("Invalid config {}: {}", path.display(), e);
            None
        }
    }
}
