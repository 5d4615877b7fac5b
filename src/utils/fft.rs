//! Fixed-size forward FFT
//!
//! Thin layer over rustfft. The plan is made once and shared, so one `Fft`
//! serves every frame of a run, from several threads if needed.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::FftPlanner;

/// Forward FFT with a cached plan
#[derive(Clone)]
pub struct Fft {
    plan: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Plan a forward FFT of `size` points
    pub fn new(size: usize) -> Self {
        Self {
            plan: FftPlanner::new().plan_fft_forward(size),
            size,
        }
    }

    /// Number of points of the transform
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Transform a real signal, zero-padded or truncated to `len()` points
    pub fn real_fft(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer = vec![Complex::new(0.0, 0.0); self.size];
        for (slot, &x) in buffer.iter_mut().zip(input) {
            slot.re = x;
        }
        self.plan.process(&mut buffer);
        buffer
    }

    /// Squared magnitude of bins `0..=len()/2`
    pub fn power_spectrum(&self, input: &[f64]) -> Vec<f64> {
        let mut spectrum = self.real_fft(input);
        spectrum.truncate(self.size / 2 + 1);
        spectrum.iter().map(Complex::norm_sqr).collect()
    }
}

impl fmt::Debug for Fft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}
