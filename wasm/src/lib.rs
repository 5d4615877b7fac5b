//! WebAssembly bindings for pitch-track
//!
//! Exposes `detectPitch` and a `Sound` class to JavaScript. Unvoiced frames
//! come back as NaN in the `values` array.

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

use pitch_track::{DetectOptions, PitchError};

/// Route Rust panics to the browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js_err(err: PitchError) -> JsError {
    JsError::new(&err.to_string())
}

/// Mono signal held on the Rust side
#[wasm_bindgen]
pub struct Sound {
    inner: pitch_track::Sound,
}

#[wasm_bindgen]
impl Sound {
    /// @param samples - mono samples
    /// @param sample_rate - rate in Hz
    #[wasm_bindgen(constructor)]
    pub fn new(samples: &Float64Array, sample_rate: f64) -> Sound {
        Sound {
            inner: pitch_track::Sound::from_samples_owned(samples.to_vec(), sample_rate),
        }
    }

    /// Rate in Hz
    #[wasm_bindgen(getter)]
    pub fn sample_rate(&self) -> f64 {
        self.inner.sample_rate()
    }

    /// Length in seconds
    #[wasm_bindgen(getter)]
    pub fn duration(&self) -> f64 {
        self.inner.duration()
    }

    #[wasm_bindgen(getter)]
    pub fn num_samples(&self) -> usize {
        self.inner.num_samples()
    }

    /// Track the pitch of this sound
    ///
    /// @param buffer_size - Samples per frame (2048 if omitted)
    /// @param unit - "Hz" or "MIDI" ("Hz" if omitted)
    /// @param method - "yin" or "yinfft" ("yinfft" if omitted)
    /// @param time_unit - "frames", "samples" or "seconds" ("seconds" if omitted)
    /// @param tolerance - Estimator threshold, method default if omitted
    pub fn detect_pitch(
        &self,
        buffer_size: Option<usize>,
        unit: Option<String>,
        method: Option<String>,
        time_unit: Option<String>,
        tolerance: Option<f64>,
    ) -> Result<PitchTrack, JsError> {
        let options = options_from_js(buffer_size, unit, method, time_unit, tolerance)?;
        let inner = self.inner.detect_pitch(&options).map_err(to_js_err)?;
        Ok(PitchTrack { inner })
    }
}

/// Result of a pitch tracking run
#[wasm_bindgen]
pub struct PitchTrack {
    inner: pitch_track::PitchTrack,
}

#[wasm_bindgen]
impl PitchTrack {
    /// Time of each frame, in the requested time unit
    #[wasm_bindgen(getter)]
    pub fn times(&self) -> Float64Array {
        Float64Array::from(self.inner.times())
    }

    /// Pitch of each frame, NaN where unvoiced
    #[wasm_bindgen(getter)]
    pub fn values(&self) -> Float64Array {
        Float64Array::from(&self.inner.values_or(f64::NAN)[..])
    }

    /// Number of frames
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    /// Number of frames with a detected pitch
    #[wasm_bindgen(getter)]
    pub fn voiced_count(&self) -> usize {
        self.inner.voiced_count()
    }

    /// Pitch unit name ("Hz" or "MIDI")
    #[wasm_bindgen(getter)]
    pub fn unit(&self) -> String {
        self.inner.unit().to_string()
    }

    /// Time unit name ("frames", "samples" or "seconds")
    #[wasm_bindgen(getter)]
    pub fn time_unit(&self) -> String {
        self.inner.time_unit().to_string()
    }
}

/// Track the pitch of a signal frame by frame
///
/// @param signal - mono samples
/// @param sample_rate - rate in Hz
/// Remaining arguments may be omitted, as for `Sound.detect_pitch`.
#[wasm_bindgen(js_name = detectPitch)]
pub fn detect_pitch(
    signal: &Float64Array,
    sample_rate: f64,
    buffer_size: Option<usize>,
    unit: Option<String>,
    method: Option<String>,
    time_unit: Option<String>,
    tolerance: Option<f64>,
) -> Result<PitchTrack, JsError> {
    let options = options_from_js(buffer_size, unit, method, time_unit, tolerance)?;
    let inner = pitch_track::detect_pitch(&signal.to_vec(), sample_rate, &options)
        .map_err(to_js_err)?;
    Ok(PitchTrack { inner })
}

fn options_from_js(
    buffer_size: Option<usize>,
    unit: Option<String>,
    method: Option<String>,
    time_unit: Option<String>,
    tolerance: Option<f64>,
) -> Result<DetectOptions, JsError> {
    let defaults = DetectOptions::default();
    let mut options = DetectOptions {
        buffer_size: buffer_size.unwrap_or(defaults.buffer_size),
        tolerance,
        ..defaults
    };
    if let Some(unit) = unit {
        options.unit = unit.parse().map_err(to_js_err)?;
    }
    if let Some(method) = method {
        options.method = method.parse().map_err(to_js_err)?;
    }
    if let Some(time_unit) = time_unit {
        options.time_unit = time_unit.parse().map_err(to_js_err)?;
    }
    Ok(options)
}
