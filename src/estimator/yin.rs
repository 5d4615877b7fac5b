//! YIN periodicity estimation
//!
//! de Cheveigné & Kawahara (2002): "YIN, a fundamental frequency estimator
//! for speech and music." The squared difference function is computed
//! directly in the time domain over lags `1..N/2`, normalised by its
//! cumulative mean, and the first dip below the tolerance is taken as the
//! period.

use super::{cumulative_mean_normalize, PeriodicityEstimator, RawEstimate};
use crate::utils::{min_index, quadratic_peak_pos};

/// Default dip threshold for YIN
pub const DEFAULT_TOLERANCE: f64 = 0.15;

/// YIN estimator with a fixed tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Yin {
    tolerance: f64,
}

impl Yin {
    /// YIN that accepts dips of the normalised difference below `tolerance`
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Dip threshold
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for Yin {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl PeriodicityEstimator for Yin {
    fn estimate(&self, frame: &[f64]) -> RawEstimate {
        estimate(frame, self.tolerance)
    }
}

/// Cumulative mean normalised difference function of one frame
///
/// Returns `frame.len() / 2` values; index 0 is 1 by definition.
pub fn difference_function(frame: &[f64]) -> Vec<f64> {
    let half = frame.len() / 2;
    let mut yin = vec![0.0; half];

    for tau in 1..half {
        yin[tau] = (0..half)
            .map(|j| {
                let delta = frame[j] - frame[j + tau];
                delta * delta
            })
            .sum();
    }
    cumulative_mean_normalize(&mut yin);
    yin
}

/// Estimate the period of one frame, in samples
///
/// Picks the first local minimum of the normalised difference that falls
/// under `tolerance`. When no such dip exists but the global minimum is
/// still under `tolerance` (a dip too close to the end of the lag range),
/// that minimum is used instead. Otherwise the frame is unvoiced.
pub fn estimate(frame: &[f64], tolerance: f64) -> RawEstimate {
    let yin = difference_function(frame);
    if yin.len() < 3 {
        return RawEstimate::UNVOICED;
    }

    // Lags below 2 are never candidates; a period of 1 sample is Nyquist.
    for period in 2..yin.len() - 1 {
        if yin[period] < tolerance && yin[period] < yin[period + 1] {
            return RawEstimate::new(quadratic_peak_pos(&yin, period));
        }
    }

    let best = min_index(&yin);
    if yin[best] < tolerance {
        RawEstimate::new(quadratic_peak_pos(&yin, best))
    } else {
        RawEstimate::UNVOICED
    }
}
