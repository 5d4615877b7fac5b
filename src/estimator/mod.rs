//! Periodicity estimators and their per-run configuration
//!
//! An estimator looks at one frame and reports a period in samples. The
//! [`MethodProfile`] binds a [`PitchMethod`] to its tolerance and to whatever
//! it precomputes once per run (YIN-FFT's spectral weights and FFT plan), and
//! turns periods into frequencies with the same rule for every method.

pub mod yin;
pub mod yinfft;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{PitchError, Result};

pub use yin::Yin;
pub use yinfft::{SpectralWeights, YinFft};

/// Direct output of an estimator for one frame: a period in samples
///
/// Any non-positive (or NaN) value means no pitch was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEstimate(f64);

impl RawEstimate {
    /// No periodicity detected
    pub const UNVOICED: RawEstimate = RawEstimate(0.0);

    /// Wrap a period in samples; pass 0 or less for no pitch
    pub fn new(period: f64) -> Self {
        RawEstimate(period)
    }

    /// The estimated period, if the frame is voiced
    pub fn period(self) -> Option<f64> {
        if self.0 > 0.0 {
            Some(self.0)
        } else {
            None
        }
    }

    /// Frequency in Hz, `sample_rate / period`, if the frame is voiced
    pub fn to_hertz(self, sample_rate: f64) -> Option<f64> {
        self.period().map(|period| sample_rate / period)
    }

    /// The raw number, sentinel included
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Anything that can estimate the period of one frame
pub trait PeriodicityEstimator {
    /// Estimate the period of `frame`, in samples
    fn estimate(&self, frame: &[f64]) -> RawEstimate;
}

/// Pitch estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchMethod {
    /// Time-domain YIN
    Yin,
    /// Spectrally weighted YIN computed with FFTs
    #[default]
    YinFft,
}

impl PitchMethod {
    /// Tolerance used when the caller does not supply one
    pub fn default_tolerance(self) -> f64 {
        match self {
            PitchMethod::Yin => yin::DEFAULT_TOLERANCE,
            PitchMethod::YinFft => yinfft::DEFAULT_TOLERANCE,
        }
    }

    /// Canonical name of the method
    pub fn name(self) -> &'static str {
        match self {
            PitchMethod::Yin => "yin",
            PitchMethod::YinFft => "yinfft",
        }
    }
}

impl FromStr for PitchMethod {
    type Err = PitchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yin" => Ok(PitchMethod::Yin),
            "yinfft" => Ok(PitchMethod::YinFft),
            _ => Err(PitchError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for PitchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
enum Estimator {
    Yin(Yin),
    YinFft(Box<YinFft>),
}

/// Estimator and parameters resolved for one pipeline run
///
/// Built once, then shared read-only by every frame.
#[derive(Debug, Clone)]
pub struct MethodProfile {
    method: PitchMethod,
    tolerance: f64,
    buffer_size: usize,
    sample_rate: f64,
    estimator: Estimator,
}

impl MethodProfile {
    /// Resolve `method` for frames of `buffer_size` samples at `sample_rate`
    ///
    /// `tolerance` overrides the method's default when given.
    ///
    /// # Errors
    /// `InvalidParameter` when the tolerance is not finite or the sample rate
    /// is not a positive finite number.
    pub fn new(
        method: PitchMethod,
        buffer_size: usize,
        sample_rate: f64,
        tolerance: Option<f64>,
    ) -> Result<Self> {
        check_parameters(sample_rate, tolerance)?;
        let tolerance = tolerance.unwrap_or_else(|| method.default_tolerance());

        let estimator = match method {
            PitchMethod::Yin => Estimator::Yin(Yin::new(tolerance)),
            PitchMethod::YinFft => {
                let weights = SpectralWeights::new(buffer_size, sample_rate);
                Estimator::YinFft(Box::new(YinFft::new(tolerance, weights)))
            }
        };

        log::debug!(
            "resolved {} profile: buffer_size={}, sample_rate={}, tolerance={}",
            method,
            buffer_size,
            sample_rate,
            tolerance
        );

        Ok(Self {
            method,
            tolerance,
            buffer_size,
            sample_rate,
            estimator,
        })
    }

    /// Resolve a method given by name
    ///
    /// # Errors
    /// `InvalidMethod` for names other than `"yin"` and `"yinfft"`.
    pub fn from_name(
        name: &str,
        buffer_size: usize,
        sample_rate: f64,
        tolerance: Option<f64>,
    ) -> Result<Self> {
        Self::new(name.parse()?, buffer_size, sample_rate, tolerance)
    }

    pub fn method(&self) -> PitchMethod {
        self.method
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Spectral weights, for methods that use them
    pub fn spectral_weights(&self) -> Option<&SpectralWeights> {
        match &self.estimator {
            Estimator::Yin(_) => None,
            Estimator::YinFft(yinfft) => Some(yinfft.weights()),
        }
    }

    /// Frequency of one frame in Hz, `None` when unvoiced
    pub fn frequency(&self, frame: &[f64]) -> Option<f64> {
        self.estimate(frame).to_hertz(self.sample_rate)
    }
}

impl PeriodicityEstimator for MethodProfile {
    fn estimate(&self, frame: &[f64]) -> RawEstimate {
        match &self.estimator {
            Estimator::Yin(yin) => yin.estimate(frame),
            Estimator::YinFft(yinfft) => yinfft.estimate(frame),
        }
    }
}

/// Reject sample rates and tolerances no estimator can work with
pub(crate) fn check_parameters(sample_rate: f64, tolerance: Option<f64>) -> Result<()> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(PitchError::InvalidParameter(format!(
            "sample rate must be positive and finite, got {}",
            sample_rate
        )));
    }
    if let Some(tolerance) = tolerance.filter(|t| !t.is_finite()) {
        return Err(PitchError::InvalidParameter(format!(
            "tolerance must be finite, got {}",
            tolerance
        )));
    }
    Ok(())
}

/// Turn a squared difference function into its cumulative mean normalised
/// form in place
///
/// `d'(0) = 1`, `d'(t) = d(t) * t / sum(d(1..=t))`, and 1 wherever the running
/// sum is still zero.
pub(crate) fn cumulative_mean_normalize(diff: &mut [f64]) {
    let Some(first) = diff.first_mut() else {
        return;
    };
    *first = 1.0;

    let mut running = 0.0;
    for (tau, value) in diff.iter_mut().enumerate().skip(1) {
        running += *value;
        if running != 0.0 {
            *value *= tau as f64 / running;
        } else {
            *value = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_raw_estimate_sentinels() {
        assert_eq!(RawEstimate::new(100.0).to_hertz(44100.0), Some(441.0));
        assert_eq!(RawEstimate::UNVOICED.to_hertz(44100.0), None);
        assert_eq!(RawEstimate::new(-1.0).period(), None);
        assert_eq!(RawEstimate::new(f64::NAN).period(), None);
        assert_eq!(RawEstimate::UNVOICED.value(), 0.0);
        assert_eq!(RawEstimate::new(-1.0).value(), -1.0);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("yin".parse::<PitchMethod>().unwrap(), PitchMethod::Yin);
        assert_eq!("yinfft".parse::<PitchMethod>().unwrap(), PitchMethod::YinFft);
        assert!(matches!(
            "bogus".parse::<PitchMethod>(),
            Err(PitchError::InvalidMethod(ref m)) if m == "bogus"
        ));
        assert_eq!(PitchMethod::default(), PitchMethod::YinFft);
    }

    #[test]
    fn test_default_tolerances() {
        let yin = MethodProfile::new(PitchMethod::Yin, 1024, 44100.0, None).unwrap();
        assert_eq!(yin.tolerance(), 0.15);
        assert!(yin.spectral_weights().is_none());

        let yinfft = MethodProfile::new(PitchMethod::YinFft, 1024, 44100.0, None).unwrap();
        assert_eq!(yinfft.tolerance(), 0.85);
        assert_eq!(yinfft.spectral_weights().unwrap().gains().len(), 513);
    }

    #[test]
    fn test_tolerance_override() {
        let profile = MethodProfile::new(PitchMethod::Yin, 1024, 44100.0, Some(0.3)).unwrap();
        assert_eq!(profile.tolerance(), 0.3);

        // An explicit zero is an override, not a request for the default
        let profile = MethodProfile::new(PitchMethod::YinFft, 1024, 44100.0, Some(0.0)).unwrap();
        assert_eq!(profile.tolerance(), 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            MethodProfile::new(PitchMethod::Yin, 1024, 0.0, None),
            Err(PitchError::InvalidParameter(_))
        ));
        assert!(matches!(
            MethodProfile::new(PitchMethod::Yin, 1024, 44100.0, Some(f64::NAN)),
            Err(PitchError::InvalidParameter(_))
        ));
        assert!(matches!(
            MethodProfile::from_name("crepe", 1024, 44100.0, None),
            Err(PitchError::InvalidMethod(_))
        ));
    }

    #[test]
    fn test_profile_frequency_matches_period() {
        let sample_rate = 16000.0;
        let frame = sine(250.0, sample_rate, 1024);

        for method in [PitchMethod::Yin, PitchMethod::YinFft] {
            let profile = MethodProfile::new(method, 1024, sample_rate, None).unwrap();
            let period = profile.estimate(&frame).period().unwrap();
            let hz = profile.frequency(&frame).unwrap();

            assert_eq!(hz, sample_rate / period);
            assert_relative_eq!(hz, 250.0, epsilon = 3.0);
        }
    }

    #[test]
    fn test_cumulative_mean_normalize() {
        let mut diff = vec![5.0, 1.0, 3.0, 0.0];
        cumulative_mean_normalize(&mut diff);

        assert_eq!(diff[0], 1.0);
        assert_relative_eq!(diff[1], 1.0);
        assert_relative_eq!(diff[2], 3.0 * 2.0 / 4.0);
        assert_relative_eq!(diff[3], 0.0);

        let mut silent = vec![0.0; 4];
        cumulative_mean_normalize(&mut silent);
        assert_eq!(silent, vec![1.0; 4]);

        let mut empty: Vec<f64> = Vec::new();
        cumulative_mean_normalize(&mut empty);
    }
}
