//! Frame-by-frame pitch tracking
//!
//! [`detect_pitch`] runs the whole pipeline: it resolves the estimator for the
//! requested method, estimates one frequency per complete frame, converts the
//! frequencies to the requested unit and builds the matching time axis.
//!
//! ```
//! use pitch_track::{detect_pitch, DetectOptions};
//!
//! let silence = vec![0.0; 1000];
//! let options = DetectOptions::default().with_buffer_size(500);
//! let track = detect_pitch(&silence, 44100.0, &options).unwrap();
//!
//! assert_eq!(track.values(), &[None, None]);
//! assert_eq!(track.times(), &[0.0, 500.0 / 44100.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::estimator::{check_parameters, MethodProfile, PitchMethod};
use crate::frames::{frame_count, Frames};
use crate::units::{FrequencyUnit, TimeUnit};
use crate::{Result, Sound};

/// Default frame length in samples
pub const DEFAULT_BUFFER_SIZE: usize = 2048;

/// Parameters of one pitch tracking run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectOptions {
    /// Samples per frame
    pub buffer_size: usize,
    /// Unit of the pitch values
    pub unit: FrequencyUnit,
    /// Periodicity estimator
    pub method: PitchMethod,
    /// Unit of the time axis
    pub time_unit: TimeUnit,
    /// Estimator threshold; the method's default when `None`
    pub tolerance: Option<f64>,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            unit: FrequencyUnit::Hertz,
            method: PitchMethod::YinFft,
            time_unit: TimeUnit::Seconds,
            tolerance: None,
        }
    }
}

impl DetectOptions {
    /// Build options from textual names
    ///
    /// # Errors
    /// `InvalidMethod`, `InvalidUnit` or `InvalidTimeUnit` for unknown names.
    pub fn from_names(
        buffer_size: usize,
        unit: &str,
        method: &str,
        time_unit: &str,
        tolerance: Option<f64>,
    ) -> Result<Self> {
        Ok(Self {
            buffer_size,
            method: method.parse()?,
            unit: unit.parse()?,
            time_unit: time_unit.parse()?,
            tolerance,
        })
    }

    /// Set the frame length in samples
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the unit of the pitch values
    pub fn with_unit(mut self, unit: FrequencyUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the periodicity estimator
    pub fn with_method(mut self, method: PitchMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the unit of the time axis
    pub fn with_time_unit(mut self, time_unit: TimeUnit) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Override the method's default tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Pitch contour with a time axis, one entry per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchTrack {
    times: Vec<f64>,
    values: Vec<Option<f64>>,
    unit: FrequencyUnit,
    time_unit: TimeUnit,
    buffer_size: usize,
    sample_rate: f64,
}

impl PitchTrack {
    /// Time of each frame, in `time_unit()`
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Pitch of each frame in `unit()`, `None` where unvoiced
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Unit of `values()`
    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Unit of `times()`
    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of frames with a detected pitch
    pub fn voiced_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// `(time, pitch)` pairs in frame order
    pub fn iter(&self) -> impl Iterator<Item = (f64, Option<f64>)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// Pitch values with unvoiced frames replaced by `fill`
    pub fn values_or(&self, fill: f64) -> Vec<f64> {
        self.values.iter().map(|v| v.unwrap_or(fill)).collect()
    }

    /// Split into the time and pitch sequences
    pub fn into_parts(self) -> (Vec<f64>, Vec<Option<f64>>) {
        (self.times, self.values)
    }
}

/// Track the pitch of `signal`, sampled at `sample_rate` Hz
///
/// The signal is cut into `floor(len / buffer_size)` frames; trailing samples
/// that do not fill a frame are ignored. A zero `buffer_size` gives an empty
/// track.
///
/// # Errors
/// `InvalidParameter` when the sample rate is not positive and finite or the
/// tolerance is not finite. Nothing is returned on error.
pub fn detect_pitch(signal: &[f64], sample_rate: f64, options: &DetectOptions) -> Result<PitchTrack> {
    let buffer_size = options.buffer_size;
    let num_frames = frame_count(signal.len(), buffer_size);

    // No frame to analyse: validate, but skip building the estimator.
    let hz = if num_frames == 0 {
        check_parameters(sample_rate, options.tolerance)?;
        Vec::new()
    } else {
        let profile = MethodProfile::new(options.method, buffer_size, sample_rate, options.tolerance)?;
        estimate_frames(signal, &profile)
    };
    debug_assert_eq!(hz.len(), num_frames);

    let values = options.unit.convert_all(&hz);
    let times = options.time_unit.axis(num_frames, buffer_size, sample_rate);

    log::debug!(
        "tracked {} frames ({} voiced), {} trailing samples dropped",
        num_frames,
        values.iter().filter(|v| v.is_some()).count(),
        signal.len() - num_frames * buffer_size
    );

    Ok(PitchTrack {
        times,
        values,
        unit: options.unit,
        time_unit: options.time_unit,
        buffer_size,
        sample_rate,
    })
}

/// Frequency in Hz of every complete frame, in frame order
#[cfg(not(feature = "parallel"))]
fn estimate_frames(signal: &[f64], profile: &MethodProfile) -> Vec<Option<f64>> {
    Frames::new(signal, profile.buffer_size())
        .map(|frame| profile.frequency(frame))
        .collect()
}

/// Frequency in Hz of every complete frame, in frame order
#[cfg(feature = "parallel")]
fn estimate_frames(signal: &[f64], profile: &MethodProfile) -> Vec<Option<f64>> {
    use rayon::prelude::*;

    let frames: Vec<&[f64]> = Frames::new(signal, profile.buffer_size()).collect();
    frames
        .par_iter()
        .map(|frame| profile.frequency(frame))
        .collect()
}

impl Sound {
    /// Track the pitch of this sound
    pub fn detect_pitch(&self, options: &DetectOptions) -> Result<PitchTrack> {
        detect_pitch(self.samples(), self.sample_rate(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PitchError;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_options() {
        let options = DetectOptions::default();
        assert_eq!(options.buffer_size, 2048);
        assert_eq!(options.unit, FrequencyUnit::Hertz);
        assert_eq!(options.method, PitchMethod::YinFft);
        assert_eq!(options.time_unit, TimeUnit::Seconds);
        assert_eq!(options.tolerance, None);
    }

    #[test]
    fn test_from_names() {
        let options = DetectOptions::from_names(1024, "MIDI", "yin", "frames", Some(0.2)).unwrap();
        assert_eq!(options.buffer_size, 1024);
        assert_eq!(options.unit, FrequencyUnit::Midi);
        assert_eq!(options.method, PitchMethod::Yin);
        assert_eq!(options.time_unit, TimeUnit::Frames);
        assert_eq!(options.tolerance, Some(0.2));

        assert!(matches!(
            DetectOptions::from_names(1024, "Hz", "bogus", "seconds", None),
            Err(PitchError::InvalidMethod(_))
        ));
        assert!(matches!(
            DetectOptions::from_names(1024, "bark", "yin", "seconds", None),
            Err(PitchError::InvalidUnit(_))
        ));
        assert!(matches!(
            DetectOptions::from_names(1024, "Hz", "yin", "beats", None),
            Err(PitchError::InvalidTimeUnit(_))
        ));
    }

    #[test]
    fn test_silence() {
        let silence = vec![0.0; 1000];
        let options = DetectOptions::default().with_buffer_size(500);
        let track = detect_pitch(&silence, 44100.0, &options).unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track.voiced_count(), 0);
        assert_eq!(track.values_or(0.0), vec![0.0, 0.0]);
        assert_eq!(track.times()[0], 0.0);
        assert_relative_eq!(track.times()[1], 500.0 / 44100.0, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_buffer_size_is_empty() {
        let signal = vec![0.1; 100];
        let options = DetectOptions::default().with_buffer_size(0);
        let track = detect_pitch(&signal, 8000.0, &options).unwrap();
        assert!(track.is_empty());
        assert!(track.times().is_empty());
    }

    #[test]
    fn test_invalid_sample_rate() {
        let options = DetectOptions::default();
        assert!(matches!(
            detect_pitch(&[0.0; 4096], -1.0, &options),
            Err(PitchError::InvalidParameter(_))
        ));
        assert!(matches!(
            detect_pitch(&[], f64::NAN, &options),
            Err(PitchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_sound_wrapper() {
        let sound = Sound::create_tone(220.0, 0.2, 16000.0, 0.5, 0.0);
        let options = DetectOptions::default().with_buffer_size(1024);
        let track = sound.detect_pitch(&options).unwrap();

        assert_eq!(track.len(), 3);
        assert_eq!(track.sample_rate(), 16000.0);
        for value in track.values() {
            assert_relative_eq!(value.unwrap(), 220.0, epsilon = 3.0);
        }
    }

    #[test]
    fn test_into_parts() {
        let silence = vec![0.0; 30];
        let options = DetectOptions::default()
            .with_buffer_size(10)
            .with_method(PitchMethod::Yin)
            .with_time_unit(TimeUnit::Samples);
        let (times, values) = detect_pitch(&silence, 1000.0, &options).unwrap().into_parts();

        assert_eq!(times, vec![0.0, 10.0, 20.0]);
        assert_eq!(values, vec![None, None, None]);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential_order() {
        let sample_rate = 16000.0;
        let mut sound = Sound::from_samples_owned(Vec::new(), sample_rate);
        for freq in [150.0, 320.0, 480.0, 210.0, 640.0, 260.0] {
            let tone = Sound::create_tone(freq, 1024.0 / sample_rate, sample_rate, 0.7, 0.0);
            sound = sound.concat(&tone).unwrap();
        }
        sound = sound.concat(&Sound::create_silence(0.1, sample_rate)).unwrap();

        for method in [PitchMethod::Yin, PitchMethod::YinFft] {
            let profile = MethodProfile::new(method, 1024, sample_rate, None).unwrap();
            let sequential: Vec<Option<f64>> = Frames::new(sound.samples(), 1024)
                .map(|frame| profile.frequency(frame))
                .collect();

            let options = DetectOptions::default()
                .with_buffer_size(1024)
                .with_method(method);
            let track = detect_pitch(sound.samples(), sample_rate, &options).unwrap();

            assert_eq!(track.values(), &sequential[..]);
            // Distinct tones, so a reordering would show
            assert!(sequential[0].unwrap() < sequential[1].unwrap());
            assert!(sequential[3].unwrap() < sequential[1].unwrap());
        }
    }
}
