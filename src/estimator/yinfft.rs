//! YIN-FFT periodicity estimation
//!
//! Spectral variant of YIN after Brossier (2006), "Automatic annotation of
//! musical audio for interactive applications". The squared difference
//! function is derived from the autocorrelation of a Hann-windowed frame,
//! computed as the FFT of its power spectrum. Each power bin is first scaled
//! by a perceptual weighting curve so that energy in the ear's most sensitive
//! region dominates the period decision.

use super::{cumulative_mean_normalize, PeriodicityEstimator, RawEstimate};
use crate::utils::{min_index, quadratic_peak_pos, Fft};
use crate::window::{apply_window, hann};

/// Default dip threshold for YIN-FFT
pub const DEFAULT_TOLERANCE: f64 = 0.85;

/// Periods of fewer samples than `sample_rate / SHORT_PERIOD_HZ` get an
/// extra octave check
const SHORT_PERIOD_HZ: f64 = 1300.0;

/// Frequencies (Hz) of the outer and middle ear response table
const WEIGHT_FREQS: [f64; 34] = [
    0.0, 20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0,
    400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0,
    6300.0, 8000.0, 9000.0, 10000.0, 12500.0, 15000.0, 20000.0, 25100.0,
];

/// Response (dB) at each entry of `WEIGHT_FREQS`
const WEIGHT_DB: [f64; 34] = [
    -75.8, -70.1, -60.8, -52.1, -44.2, -37.5, -31.3, -25.6, -20.9, -16.5, -12.6, -9.6, -7.0,
    -4.7, -3.0, -1.8, -0.8, -0.2, -0.0, 0.5, 1.6, 3.2, 5.4, 7.8, 8.1, 5.3, -2.4, -11.1, -12.8,
    -12.2, -7.4, -17.8, -17.8, -17.8,
];

/// Linear gain per spectral bin, for one frame size and sample rate
///
/// Holds `buffer_size / 2 + 1` values, one per bin from DC to Nyquist.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralWeights {
    gains: Vec<f64>,
    buffer_size: usize,
    sample_rate: f64,
}

impl SpectralWeights {
    /// Build the weighting table for frames of `buffer_size` samples
    pub fn new(buffer_size: usize, sample_rate: f64) -> Self {
        let gains = (0..=buffer_size / 2)
            .map(|bin| {
                let freq = bin as f64 * sample_rate / buffer_size as f64;
                db_to_linear(response_db(freq))
            })
            .collect();

        Self {
            gains,
            buffer_size,
            sample_rate,
        }
    }

    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

/// Ear response in dB at `freq`, linear between table points
fn response_db(freq: f64) -> f64 {
    let Some(j) = WEIGHT_FREQS.iter().position(|&f| f >= freq) else {
        return WEIGHT_DB[WEIGHT_DB.len() - 1];
    };
    if j == 0 {
        return WEIGHT_DB[0];
    }
    let (f0, f1) = (WEIGHT_FREQS[j - 1], WEIGHT_FREQS[j]);
    let (a0, a1) = (WEIGHT_DB[j - 1], WEIGHT_DB[j]);
    a0 + (a1 - a0) * (freq - f0) / (f1 - f0)
}

fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// YIN-FFT estimator with its window, FFT plan and weights prepared
#[derive(Debug, Clone)]
pub struct YinFft {
    tolerance: f64,
    sample_rate: f64,
    weights: SpectralWeights,
    window: Vec<f64>,
    fft: Fft,
}

impl YinFft {
    /// Prepare the window and FFT plan for frames the size of `weights`
    ///
    /// # Arguments
    /// * `tolerance` - Highest normalised difference accepted as a dip
    /// * `weights` - Per-bin gains, which also fix the frame size and sample rate
    pub fn new(tolerance: f64, weights: SpectralWeights) -> Self {
        let size = weights.buffer_size();
        Self {
            tolerance,
            sample_rate: weights.sample_rate(),
            window: hann(size),
            fft: Fft::new(size),
            weights,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn weights(&self) -> &SpectralWeights {
        &self.weights
    }

    /// Cumulative mean normalised difference function of one frame
    ///
    /// Returns `buffer_size / 2 + 1` values; index 0 is 1 by definition.
    /// A frame that is not exactly `buffer_size` samples long gives a flat
    /// curve of ones.
    pub fn difference_function(&self, frame: &[f64]) -> Vec<f64> {
        let n = self.fft.len();
        let half = n / 2;
        let gains = self.weights.gains();
        if frame.len() != n || n < 2 {
            return vec![1.0; half + 1];
        }

        let power = self.fft.power_spectrum(&apply_window(frame, &self.window));

        let mut sqrmag = vec![0.0; n];
        for k in 0..=half {
            sqrmag[k] = power[k] * gains[k];
        }
        for k in half + 1..n {
            sqrmag[k] = sqrmag[n - k];
        }
        let sum = 2.0 * sqrmag.iter().take(half + 1).sum::<f64>();

        let autocorr = self.fft.real_fft(&sqrmag);

        let mut yin = vec![0.0; half + 1];
        for tau in 1..=half {
            yin[tau] = sum - autocorr[tau].re;
        }
        cumulative_mean_normalize(&mut yin);
        yin
    }

    fn pick_period(&self, yin: &[f64]) -> RawEstimate {
        let tau = min_index(yin);
        if yin[tau] >= self.tolerance {
            return RawEstimate::UNVOICED;
        }

        let short_period = (self.sample_rate / SHORT_PERIOD_HZ).round() as usize;
        if tau > short_period {
            return RawEstimate::new(quadratic_peak_pos(yin, tau));
        }

        // High pitches are prone to octave errors: prefer the half period
        // when it also clears the tolerance.
        let half_period = (tau as f64 / 2.0 + 0.5).floor() as usize;
        let peak = if yin[half_period] < self.tolerance {
            half_period
        } else {
            tau
        };
        RawEstimate::new(quadratic_peak_pos(yin, peak))
    }
}

impl PeriodicityEstimator for YinFft {
    fn estimate(&self, frame: &[f64]) -> RawEstimate {
        let yin = self.difference_function(frame);
        self.pick_period(&yin)
    }
}

/// Estimate the period of one frame, in samples
///
/// One-shot form of [`YinFft`]; the weights must have been built for
/// `frame.len()` samples at `sample_rate`.
pub fn estimate(
    frame: &[f64],
    tolerance: f64,
    sample_rate: f64,
    weights: &SpectralWeights,
) -> RawEstimate {
    if weights.sample_rate() != sample_rate {
        log::warn!(
            "spectral weights built for {} Hz used at {} Hz",
            weights.sample_rate(),
            sample_rate
        );
    }
    YinFft::new(tolerance, weights.clone()).estimate(frame)
}
