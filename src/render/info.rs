use std::fmt;

use serde::Serialize;

use crate::samples::SampleBuffer;

use super::result::SpectrogramResult;

/// An SI prefix with its scale factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SiPrefix {
    pub name: &'static str,
    pub scale: f64,
    pub symbol: &'static str,
}

const fn si(name: &'static str, scale: f64, symbol: &'static str) -> SiPrefix {
    SiPrefix { name, scale, symbol }
}

const PREFIXES: [SiPrefix; 17] = [
    si("yotta", 1e24, "Y"),
    si("zetta", 1e21, "Z"),
    si("exa", 1e18, "E"),
    si("peta", 1e15, "P"),
    si("tera", 1e12, "T"),
    si("giga", 1e9, "G"),
    si("mega", 1e6, "M"),
    si("kilo", 1e3, "k"),
    si("", 1e0, ""),
    si("milli", 1e-3, "m"),
    si("micro", 1e-6, "u"),
    si("nano", 1e-9, "n"),
    si("pico", 1e-12, "p"),
    si("femto", 1e-15, "f"),
    si("atto", 1e-18, "a"),
    si("zepto", 1e-21, "z"),
    si("yocto", 1e-24, "y"),
];

/// Largest prefix that leaves at least `min_int` in the integer part.
pub fn autorange(value: f64, min_int: f64) -> SiPrefix {
    const UNIT: usize = 8;
    if value == 0.0 {
        return PREFIXES[UNIT];
    }
    let scaled = value / min_int;
    PREFIXES
        .iter()
        .copied()
        .find(|p| scaled >= p.scale)
        .unwrap_or(PREFIXES[PREFIXES.len() - 1])
}

/// `value` scaled by its [`autorange`] prefix, e.g. `433.92M`.
pub fn format_si(value: f64) -> String {
    let prefix = autorange(value, 10.0);
    format!("{}{}", value / prefix.scale, prefix.symbol)
}

/// Human-readable summary of a rendered capture.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderInfo {
    pub lines: Vec<(String, String)>,
}

impl RenderInfo {
    pub fn new(name: Option<&str>, buffer: &SampleBuffer<'_>, result: &SpectrogramResult) -> Self {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: String| lines.push((label.to_string(), value));

        if let Some(name) = name {
            push("File name", name.to_string());
        }
        push("File size", format!("{} bytes", buffer.bytes().len()));
        push("Sample format", buffer.format().to_string());
        push("No. of samples", format!("{} S", buffer.sample_count()));
        push("Stride (window to window)", format!("x {:.1}", result.stride));
        if buffer.center_freq() != 0.0 {
            push("Center frequency", format_si(buffer.center_freq()));
        }
        push("Sample rate", format_si(buffer.sample_rate()));
        push("Length (time)", format!("{:.3} s", buffer.duration()));
        push(
            "dBfs scale",
            format!("{:.1} dB to {:.1} dB", result.dbfs_min, result.dbfs_max),
        );
        Self { lines }
    }
}

impl fmt::Display for RenderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pad = self.lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        for (label, value) in &self.lines {
            writeln!(f, "{:<pad$}  {}", label, value, pad = pad)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autorange_keeps_two_integer_digits() {
        assert_eq!(autorange(433.92e6, 10.0).symbol, "M");
        assert_eq!(autorange(9.9e6, 10.0).symbol, "k");
        assert_eq!(autorange(250e3, 10.0).symbol, "k");
        assert_eq!(autorange(0.0, 10.0).symbol, "");
        assert_eq!(autorange(12.0, 10.0).symbol, "");
        assert_eq!(autorange(0.05, 10.0).symbol, "m");
        assert_eq!(autorange(1e-40, 10.0).name, "yocto");
        assert_eq!(autorange(1e30, 10.0).name, "yotta");
    }

    #[test]
    fn formats_with_prefix() {
        assert_eq!(format_si(433.92e6), "433.92M");
        assert_eq!(format_si(250e3), "250k");
        assert_eq!(format_si(1e6), "1000k");
    }
}
