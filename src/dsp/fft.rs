use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};

/// Radix-2 decimation-in-time FFT of one fixed power-of-two size.
///
/// Twiddle tables are built once; transforms borrow `&self` and never
/// allocate, so one instance can be shared by every tile of a render.
#[derive(Clone, Debug)]
pub struct Fft {
    n: usize,
    levels: u32,
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

impl Fft {
    pub fn new(n: usize) -> Result<Self> {
        if !n.is_power_of_two() {
            return Err(Error::InvalidSize(n));
        }
        let levels = n.trailing_zeros();
        let (cos_table, sin_table) = (0..n / 2)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / n as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Ok(Self { n, levels, cos_table, sin_table })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    fn check(&self, real: &[f64], imag: &[f64]) -> Result<()> {
        if real.len() != self.n || imag.len() != self.n {
            return Err(Error::InvalidParameter(format!(
                "transform of size {} given buffers of {} and {}",
                self.n,
                real.len(),
                imag.len()
            )));
        }
        Ok(())
    }

    /// Forward DFT of `real + j imag`, in place.
    pub fn transform(&self, real: &mut [f64], imag: &mut [f64]) -> Result<()> {
        self.check(real, imag)?;
        let n = self.n;

        // Bit-reversed addressing permutation
        for i in 0..n {
            let j = reverse_bits(i, self.levels);
            if j > i {
                real.swap(i, j);
                imag.swap(i, j);
            }
        }

        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let table_step = n / size;
            for start in (0..n).step_by(size) {
                for (j, k) in (start..start + half).zip((0..).step_by(table_step)) {
                    let l = j + half;
                    let (c, s) = (self.cos_table[k], self.sin_table[k]);
                    let tpre = real[l] * c + imag[l] * s;
                    let tpim = -real[l] * s + imag[l] * c;
                    real[l] = real[j] - tpre;
                    imag[l] = imag[j] - tpim;
                    real[j] += tpre;
                    imag[j] += tpim;
                }
            }
            size *= 2;
        }
        Ok(())
    }

    /// Inverse DFT including the `1/n` scale, in place.
    pub fn inverse(&self, real: &mut [f64], imag: &mut [f64]) -> Result<()> {
        // Swapping the parts conjugates both input and output.
        self.transform(imag, real)?;
        let scale = 1.0 / self.n as f64;
        for v in real.iter_mut().chain(imag.iter_mut()) {
            *v *= scale;
        }
        Ok(())
    }

    /// Separates the transform of two real channels packed as `I + jQ`.
    ///
    /// Afterwards bins `1..n/2` hold the first channel and bins `n-1` down to
    /// `n/2+1` hold the second. Bin 0 carries the first channel's DC and bin
    /// `n/2` the second channel's DC, both real-only.
    pub fn split_real(&self, real: &mut [f64], imag: &mut [f64]) -> Result<()> {
        self.check(real, imag)?;
        let n = self.n;
        if n < 2 {
            imag.iter_mut().for_each(|v| *v = 0.0);
            return Ok(());
        }

        let dc_second = imag[0];
        imag[0] = 0.0;
        real[n / 2] = dc_second;
        imag[n / 2] = 0.0;
        for i in 1..n / 2 {
            let lr = 0.5 * (real[i] + real[n - i]);
            let li = 0.5 * (imag[i] - imag[n - i]);
            let rr = 0.5 * (imag[i] + imag[n - i]);
            let ri = 0.5 * (-real[i] + real[n - i]);
            real[i] = lr;
            imag[i] = li;
            real[n - i] = rr;
            imag[n - i] = ri;
        }
        Ok(())
    }
}

fn reverse_bits(x: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        x.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Size-keyed cache of [`Fft`] instances, safe to share across workers.
#[derive(Debug, Default)]
pub struct FftCache {
    engines: Mutex<HashMap<usize, Arc<Fft>>>,
}

impl FftCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the engine for size `n`, building it on first use.
    pub fn get(&self, n: usize) -> Result<Arc<Fft>> {
        let mut engines = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fft) = engines.get(&n) {
            return Ok(Arc::clone(fft));
        }
        let fft = Arc::new(Fft::new(n)?);
        log::debug!("Built FFT tables for n={}", n);
        engines.insert(n, Arc::clone(&fft));
        Ok(fft)
    }

    pub fn len(&self) -> usize {
        self.engines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
