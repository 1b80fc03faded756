use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::{Error, Result};

const STOPS: usize = 256;

/// Ordered RGB colour map indexed by quantised dB value. Index 0 is the
/// quietest colour and the last index the loudest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

/// Built-in colour maps addressable by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NamedPalette {
    #[default]
    Sox,
    Naive,
    Grayscale,
    Roentgen,
    Phosphor,
}

impl NamedPalette {
    pub const ALL: [NamedPalette; 5] = [
        NamedPalette::Sox,
        NamedPalette::Naive,
        NamedPalette::Grayscale,
        NamedPalette::Roentgen,
        NamedPalette::Phosphor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NamedPalette::Sox => "sox",
            NamedPalette::Naive => "naive",
            NamedPalette::Grayscale => "grayscale",
            NamedPalette::Roentgen => "roentgen",
            NamedPalette::Phosphor => "phosphor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NamedPalette::Sox => "SoX spectrogram colours",
            NamedPalette::Naive => "naive rainbow",
            NamedPalette::Grayscale => "black to white",
            NamedPalette::Roentgen => "white to black",
            NamedPalette::Phosphor => "black to green",
        }
    }

    pub fn build(self) -> Palette {
        let colors = (0..STOPS)
            .map(|i| match self {
                NamedPalette::Sox => sox(i, STOPS),
                NamedPalette::Naive => naive(i, STOPS),
                NamedPalette::Grayscale => {
                    let c = (i * 255 / STOPS) as u8;
                    [c, c, c]
                }
                NamedPalette::Roentgen => {
                    let c = (255.0 - i as f64 * 255.0 / STOPS as f64) as u8;
                    [c, c, c]
                }
                NamedPalette::Phosphor => phosphor(i, STOPS),
            })
            .collect();
        Palette { colors }
    }
}

impl FromStr for NamedPalette {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        NamedPalette::ALL
            .into_iter()
            .find(|p| p.name() == key || (key == "gray" && *p == NamedPalette::Grayscale))
            .ok_or_else(|| Error::InvalidParameter(format!("unknown palette '{}'", s)))
    }
}

fn sox(i: usize, stops: usize) -> [u8; 3] {
    let x = i as f64 / (stops as f64 - 1.0);
    let r = if x < 0.13 {
        0.0
    } else if x < 0.73 {
        ((x - 0.13) / 0.60 * PI / 2.0).sin()
    } else {
        1.0
    };
    let g = if x < 0.60 {
        0.0
    } else if x < 0.91 {
        ((x - 0.60) / 0.31 * PI / 2.0).sin()
    } else {
        1.0
    };
    let b = if x < 0.60 {
        0.5 * (x / 0.60 * PI).sin()
    } else if x < 0.78 {
        0.0
    } else {
        (x - 0.78) / 0.22
    };
    [r, g, b].map(|c| (255.0 * c).round() as u8)
}

fn naive(i: usize, stops: usize) -> [u8; 3] {
    let (i, q) = (i as f64, stops as f64 / 4.0);
    let (r, g, b) = if i < q {
        (0.0, 0.0, i * 128.0 / q)
    } else if i < 2.0 * q {
        (i - q, 0.0, 256.0 - i / 2.0)
    } else if i < 3.0 * q {
        (255.0, i - 2.0 * q, 0.0)
    } else {
        (255.0, 255.0, i - 3.0 * q)
    };
    [r as u8, g as u8, b as u8]
}

fn phosphor(i: usize, stops: usize) -> [u8; 3] {
    let (i, h) = (i as f64, stops as f64 / 2.0);
    let (r, g, b) = if i < h {
        (0.0, i * 191.0 / h, 0.0)
    } else {
        let t = (i - h) / h;
        (t * 255.0, 191.0 + t * 64.0, t * 255.0)
    };
    [r as u8, g as u8, b as u8]
}

impl Palette {
    pub fn from_colors(colors: Vec<[u8; 3]>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::InvalidParameter("palette has no colours".into()));
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> [u8; 3] {
        self.colors[index]
    }

    /// Copy with the first and last entries forced to black and white so
    /// out-of-range values saturate visibly.
    pub fn with_saturation_marks(&self) -> Palette {
        let mut colors = self.colors.clone();
        if let Some(first) = colors.first_mut() {
            *first = [0, 0, 0];
        }
        if let Some(last) = colors.last_mut() {
            *last = [255, 255, 255];
        }
        Palette { colors }
    }
}

impl Default for Palette {
    fn default() -> Self {
        NamedPalette::default().build()
    }
}

impl From<NamedPalette> for Palette {
    fn from(named: NamedPalette) -> Self {
        named.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_have_256_stops() {
        for named in NamedPalette::ALL {
            assert_eq!(named.build().len(), 256, "{}", named.name());
        }
    }

    #[test]
    fn sox_runs_dark_to_bright() {
        let sox = NamedPalette::Sox.build();
        assert_eq!(sox.color(0), [0, 0, 0]);
        assert_eq!(sox.color(255), [255, 255, 255]);
        // Blue hump in the lower half.
        assert!(sox.color(77)[2] > 100);
    }

    #[test]
    fn grey_ramps() {
        let gray = NamedPalette::Grayscale.build();
        assert_eq!(gray.color(0), [0, 0, 0]);
        assert_eq!(gray.color(128), [127, 127, 127]);
        let roentgen = NamedPalette::Roentgen.build();
        assert_eq!(roentgen.color(0), [255, 255, 255]);
        assert_eq!(roentgen.color(255), [0, 0, 0]);
    }

    #[test]
    fn saturation_marks_overwrite_the_ends() {
        let palette = Palette::from_colors(vec![[10, 20, 30]; 4]).unwrap();
        let marked = palette.with_saturation_marks();
        assert_eq!(marked.color(0), [0, 0, 0]);
        assert_eq!(marked.color(1), [10, 20, 30]);
        assert_eq!(marked.color(3), [255, 255, 255]);
        assert_eq!(palette.color(0), [10, 20, 30]);
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(Palette::from_colors(Vec::new()).is_err());
    }

    #[test]
    fn parses_names() {
        assert_eq!("SOX".parse::<NamedPalette>().unwrap(), NamedPalette::Sox);
        assert_eq!("gray".parse::<NamedPalette>().unwrap(), NamedPalette::Grayscale);
        assert!("cube1".parse::<NamedPalette>().is_err());
    }
}
