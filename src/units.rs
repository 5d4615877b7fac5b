//! Frequency and time units of a pitch track
//!
//! Estimators always report Hz; [`FrequencyUnit`] maps those values to the
//! unit the caller asked for. [`TimeUnit`] builds the time axis that runs
//! alongside the pitch values, one entry per frame.
//!
//! Unvoiced frames are carried as `None` and are never pushed through a
//! conversion formula, so `log2(0)` cannot leak into MIDI output.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PitchError;

/// MIDI note number of the reference pitch A4
const MIDI_A4: f64 = 69.0;
/// Frequency of A4 in Hz
const HZ_A4: f64 = 440.0;

/// Units for pitch values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrequencyUnit {
    #[default]
    #[serde(rename = "Hz")]
    Hertz,
    #[serde(rename = "MIDI")]
    Midi,
}

/// Units for the time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Frame index
    Frames,
    /// Offset of the frame's first sample
    Samples,
    /// Offset of the frame's first sample in seconds
    #[default]
    Seconds,
}

impl FrequencyUnit {
    /// Convert a frequency in Hz to this unit
    ///
    /// Returns `None` when the value has no representation in this unit
    /// (non-positive or non-finite input for MIDI).
    pub fn from_hertz(self, hz: f64) -> Option<f64> {
        match self {
            FrequencyUnit::Hertz => Some(hz),
            FrequencyUnit::Midi => {
                if hz > 0.0 && hz.is_finite() {
                    Some(hz_to_midi(hz))
                } else {
                    None
                }
            }
        }
    }

    /// Convert from this unit to Hz
    pub fn to_hertz(self, value: f64) -> f64 {
        match self {
            FrequencyUnit::Hertz => value,
            FrequencyUnit::Midi => midi_to_hz(value),
        }
    }

    /// Convert a whole Hz sequence, keeping unvoiced entries unvoiced
    pub fn convert_all(self, hz: &[Option<f64>]) -> Vec<Option<f64>> {
        hz.iter()
            .map(|&value| convert_frequency(value, FrequencyUnit::Hertz, self))
            .collect()
    }

    /// Canonical name of the unit
    pub fn name(self) -> &'static str {
        match self {
            FrequencyUnit::Hertz => "Hz",
            FrequencyUnit::Midi => "MIDI",
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hz" | "hertz" => Ok(FrequencyUnit::Hertz),
            "midi" => Ok(FrequencyUnit::Midi),
            _ => Err(PitchError::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TimeUnit {
    /// Build the time axis for `num_frames` frames of `buffer_size` samples
    ///
    /// Element `i` marks the start of frame `i`. Spacing is exact: values are
    /// computed as `i * step`, never accumulated.
    pub fn axis(self, num_frames: usize, buffer_size: usize, sample_rate: f64) -> Vec<f64> {
        let step = match self {
            TimeUnit::Frames => 1.0,
            TimeUnit::Samples => buffer_size as f64,
            TimeUnit::Seconds => buffer_size as f64 / sample_rate,
        };
        (0..num_frames).map(|i| i as f64 * step).collect()
    }

    /// Canonical name of the unit
    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Frames => "frames",
            TimeUnit::Samples => "samples",
            TimeUnit::Seconds => "seconds",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frames" => Ok(TimeUnit::Frames),
            "samples" => Ok(TimeUnit::Samples),
            "seconds" => Ok(TimeUnit::Seconds),
            _ => Err(PitchError::InvalidTimeUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Convert a possibly-unvoiced frequency between units
///
/// `None` passes through unchanged.
pub fn convert_frequency(value: Option<f64>, from: FrequencyUnit, to: FrequencyUnit) -> Option<f64> {
    let value = value?;
    if from == to {
        return Some(value);
    }
    to.from_hertz(from.to_hertz(value))
}

/// Convert Hz to a (fractional) MIDI note number, A4 = 440 Hz = 69
pub fn hz_to_midi(hz: f64) -> f64 {
    MIDI_A4 + 12.0 * (hz / HZ_A4).log2()
}

/// Convert a MIDI note number to Hz
pub fn midi_to_hz(midi: f64) -> f64 {
    HZ_A4 * 2.0_f64.powf((midi - MIDI_A4) / 12.0)
}
