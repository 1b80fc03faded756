use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Source of coefficients for a caller-defined window.
///
/// Implementations must return exactly `n` values and have no side effects.
pub trait WindowGenerator: Send + Sync {
    fn generate(&self, n: usize) -> Vec<f64>;
}

impl<F> WindowGenerator for F
where
    F: Fn(usize) -> Vec<f64> + Send + Sync,
{
    fn generate(&self, n: usize) -> Vec<f64> {
        self(n)
    }
}

/// Window applied to every transform block.
#[derive(Clone, Default)]
pub enum WindowKind {
    Rectangular,
    Bartlett,
    Hamming,
    Hann,
    Blackman,
    #[default]
    BlackmanHarris,
    Custom(Arc<dyn WindowGenerator>),
}

impl WindowKind {
    pub const NAMED: [WindowKind; 6] = [
        WindowKind::Rectangular,
        WindowKind::Bartlett,
        WindowKind::Hamming,
        WindowKind::Hann,
        WindowKind::Blackman,
        WindowKind::BlackmanHarris,
    ];

    pub fn custom(generator: impl WindowGenerator + 'static) -> Self {
        WindowKind::Custom(Arc::new(generator))
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Bartlett => "bartlett",
            WindowKind::Hamming => "hamming",
            WindowKind::Hann => "hann",
            WindowKind::Blackman => "blackman",
            WindowKind::BlackmanHarris => "blackman-harris",
            WindowKind::Custom(_) => "custom",
        }
    }

    /// Computes the `n` coefficients of this window and their sum.
    pub fn coefficients(&self, n: usize) -> Result<WindowCoefficients> {
        let coefficients = match self {
            WindowKind::Custom(generator) => {
                let c = generator.generate(n);
                if c.len() != n {
                    return Err(Error::WindowLength { expected: n, got: c.len() });
                }
                c
            }
            // The closed forms divide by n - 1.
            _ if n == 1 => vec![1.0],
            WindowKind::Rectangular => vec![1.0; n],
            WindowKind::Bartlett => {
                let half = 0.5 * (n as f64 - 1.0);
                (0..n).map(|i| 1.0 - ((i as f64 - half) / half).abs()).collect()
            }
            WindowKind::Hamming => cosine_sum(n, &[0.54, 0.46]),
            WindowKind::Hann => cosine_sum(n, &[0.5, 0.5]),
            WindowKind::Blackman => cosine_sum(n, &[0.42, 0.5, 0.08]),
            WindowKind::BlackmanHarris => cosine_sum(n, &[0.35875, 0.48829, 0.14128, 0.01168]),
        };
        Ok(WindowCoefficients::from_coefficients(coefficients))
    }
}

/// `a0 - a1 cos(2 pi i / (n-1)) + a2 cos(4 pi i / (n-1)) - ...`
fn cosine_sum(n: usize, a: &[f64]) -> Vec<f64> {
    let denom = n as f64 - 1.0;
    (0..n)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / denom;
            a.iter()
                .enumerate()
                .map(|(k, ak)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * ak * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

impl fmt::Debug for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for WindowKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (WindowKind::Custom(a), WindowKind::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => a.name() == b.name(),
        }
    }
}

impl FromStr for WindowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "rectangular" | "rect" | "boxcar" => Ok(WindowKind::Rectangular),
            "bartlett" | "triangle" => Ok(WindowKind::Bartlett),
            "hamming" => Ok(WindowKind::Hamming),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            "blackman" => Ok(WindowKind::Blackman),
            "blackmanharris" => Ok(WindowKind::BlackmanHarris),
            _ => Err(Error::InvalidParameter(format!("unknown window '{}'", s))),
        }
    }
}

/// Window coefficients together with their exact sum.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCoefficients {
    coefficients: Vec<f64>,
    weight: f64,
}

impl WindowCoefficients {
    /// The weight is summed here so it always matches the coefficients.
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        let weight = coefficients.iter().sum();
        Self { coefficients, weight }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Power normalisation applied to every block, `1 / weight`.
    pub fn block_norm(&self) -> f64 {
        1.0 / self.weight
    }

    pub fn block_norm_db(&self) -> f64 {
        10.0 * self.block_norm().log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_is_the_exact_coefficient_sum() {
        for kind in WindowKind::NAMED {
            for n in [1, 2, 3, 16, 255, 1024] {
                let w = kind.coefficients(n).unwrap();
                assert_eq!(w.len(), n);
                let sum: f64 = w.coefficients().iter().sum();
                assert_eq!(w.weight(), sum, "{:?} n={}", kind, n);
                assert!(w.weight().is_finite());
            }
        }
    }

    #[test]
    fn closed_forms() {
        let rect = WindowKind::Rectangular.coefficients(8).unwrap();
        assert_eq!(rect.weight(), 8.0);
        assert_eq!(rect.block_norm(), 0.125);

        let hann = WindowKind::Hann.coefficients(5).unwrap();
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (a, b) in hann.coefficients().iter().zip(expected) {
            assert!((a - b).abs() < 1e-12);
        }

        let bartlett = WindowKind::Bartlett.coefficients(5).unwrap();
        assert_eq!(bartlett.coefficients(), &[0.0, 0.5, 1.0, 0.5, 0.0]);

        let hamming = WindowKind::Hamming.coefficients(3).unwrap();
        assert!((hamming.coefficients()[0] - 0.08).abs() < 1e-12);
        assert!((hamming.coefficients()[1] - 1.0).abs() < 1e-12);

        // Each Blackman-family window peaks at 1.0 in the middle.
        for kind in [WindowKind::Blackman, WindowKind::BlackmanHarris] {
            let w = kind.coefficients(9).unwrap();
            assert!((w.coefficients()[4] - 1.0).abs() < 1e-9, "{:?}", kind);
        }
    }

    #[test]
    fn single_point_windows_are_unit() {
        for kind in WindowKind::NAMED {
            let w = kind.coefficients(1).unwrap();
            assert_eq!(w.coefficients(), &[1.0]);
            assert_eq!(w.weight(), 1.0);
        }
    }

    #[test]
    fn custom_generator() {
        let kind = WindowKind::custom(|n: usize| (0..n).map(|i| i as f64).collect());
        let w = kind.coefficients(4).unwrap();
        assert_eq!(w.weight(), 6.0);

        let bad = WindowKind::custom(|_n: usize| vec![1.0; 3]);
        assert_eq!(
            bad.coefficients(4).unwrap_err(),
            Error::WindowLength { expected: 4, got: 3 }
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("Blackman-Harris".parse::<WindowKind>().unwrap(), WindowKind::BlackmanHarris);
        assert_eq!("hann".parse::<WindowKind>().unwrap(), WindowKind::Hann);
        assert_eq!("rectangular".parse::<WindowKind>().unwrap(), WindowKind::Rectangular);
        assert!("kaiser".parse::<WindowKind>().is_err());
        for kind in WindowKind::NAMED {
            assert_eq!(kind.name().parse::<WindowKind>().unwrap(), kind);
        }
    }
}
