//! pitch-track: frame-based fundamental frequency tracking
//!
//! The signal is cut into fixed-size, non-overlapping frames. Each frame is
//! handed to a periodicity estimator (YIN or YIN-FFT), the estimated period is
//! turned into a frequency, and a time axis aligned with the frames is built
//! in the requested time unit.
//!
//! # Core Types
//!
//! - [`Sound`] - Audio samples with sample rate
//! - [`DetectOptions`] - Frame size, method, tolerance and output units
//! - [`PitchTrack`] - Aligned time and pitch sequences
//! - [`MethodProfile`] - Resolved estimator and parameters for one run
//!
//! # Example
//! ```
//! use pitch_track::{detect_pitch, DetectOptions, Sound, TimeUnit};
//!
//! let tone = Sound::create_tone(440.0, 0.5, 44100.0, 0.8, 0.0);
//! let options = DetectOptions::default().with_time_unit(TimeUnit::Frames);
//! let track = detect_pitch(tone.samples(), tone.sample_rate(), &options).unwrap();
//!
//! assert_eq!(track.len(), tone.num_samples() / 2048);
//! assert_eq!(track.times()[1], 1.0);
//! ```

pub mod sound;
pub mod window;
pub mod frames;
pub mod estimator;
pub mod units;
pub mod pitch;

pub mod utils;

// Re-export main types at crate root
pub use sound::Sound;
pub use frames::{frame_count, Frames};
pub use estimator::{MethodProfile, PeriodicityEstimator, PitchMethod, RawEstimate, SpectralWeights};
pub use units::{hz_to_midi, midi_to_hz, FrequencyUnit, TimeUnit};
pub use pitch::{detect_pitch, DetectOptions, PitchTrack};

use thiserror::Error;

/// Errors that can occur in pitch tracking operations
#[derive(Error, Debug)]
pub enum PitchError {
    #[error("Method not found: {0:?} (expected \"yin\" or \"yinfft\")")]
    InvalidMethod(String),

    #[error("Frequency unit not valid: {0:?} (expected \"Hz\" or \"MIDI\")")]
    InvalidUnit(String),

    #[error("Time unit not valid: {0:?} (expected \"frames\", \"samples\" or \"seconds\")")]
    InvalidTimeUnit(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV decoding error: {0}")]
    WavDecode(#[from] hound::Error),

    #[error("Decoding error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, PitchError>;
