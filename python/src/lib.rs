//! Python bindings for pitch-track
//!
//! `detect_pitch(signal, sample_rate, ...)` returns `(time, pitch)` numpy
//! arrays. Unvoiced frames are 0.0 in Hz and NaN in MIDI.

use std::borrow::Cow;

use numpy::ndarray::ArrayView1;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use ::pitch_track::{
    detect_pitch as rust_detect_pitch, DetectOptions, FrequencyUnit, PitchError, PitchTrack as RustPitchTrack,
    Sound as RustSound,
};

fn to_py_err(err: PitchError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Borrow contiguous arrays, copy strided views such as `x[::2]`
fn signal_samples<'a>(view: ArrayView1<'a, f64>) -> Cow<'a, [f64]> {
    match view.to_slice() {
        Some(samples) => Cow::Borrowed(samples),
        None => Cow::Owned(view.to_vec()),
    }
}

/// Mono signal, built from a numpy array or decoded from a file
#[pyclass(name = "Sound")]
pub struct PySound {
    inner: RustSound,
}

#[pymethods]
impl PySound {
    /// Parameters
    /// ----------
    /// samples : numpy.ndarray
    ///     1D float64 mono samples
    /// sample_rate : float
    ///     Rate in Hz
    #[new]
    fn new(samples: PyReadonlyArray1<f64>, sample_rate: f64) -> PyResult<Self> {
        let samples = signal_samples(samples.as_array()).into_owned();
        Ok(PySound {
            inner: RustSound::from_samples_owned(samples, sample_rate),
        })
    }

    /// Decode an audio file; several channels are averaged to mono
    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        RustSound::from_file(path)
            .map(|inner| PySound { inner })
            .map_err(to_py_err)
    }

    /// Rate in Hz
    #[getter]
    fn sample_rate(&self) -> f64 {
        self.inner.sample_rate()
    }

    /// Length in seconds
    #[getter]
    fn duration(&self) -> f64 {
        self.inner.duration()
    }

    /// Copy of the samples
    fn samples<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.samples().to_vec().into_pyarray_bound(py)
    }

    /// Track the pitch of this sound
    ///
    /// Same parameters and result as the module-level `detect_pitch`.
    #[pyo3(signature = (buffer_size=2048, unit="Hz", method="yinfft", time_unit="seconds", tolerance=None))]
    fn detect_pitch<'py>(
        &self,
        py: Python<'py>,
        buffer_size: usize,
        unit: &str,
        method: &str,
        time_unit: &str,
        tolerance: Option<f64>,
    ) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
        let options = DetectOptions::from_names(buffer_size, unit, method, time_unit, tolerance)
            .map_err(to_py_err)?;
        let track = self.inner.detect_pitch(&options).map_err(to_py_err)?;
        Ok(track_to_arrays(py, track))
    }
}

/// Unvoiced frames become 0.0 in Hz and NaN in MIDI, where 0 is a real note
fn track_to_arrays(
    py: Python<'_>,
    track: RustPitchTrack,
) -> (Bound<'_, PyArray1<f64>>, Bound<'_, PyArray1<f64>>) {
    let fill = match track.unit() {
        FrequencyUnit::Hertz => 0.0,
        FrequencyUnit::Midi => f64::NAN,
    };
    let pitch = track.values_or(fill);
    let (times, _) = track.into_parts();
    (times.into_pyarray_bound(py), pitch.into_pyarray_bound(py))
}

/// Track the pitch of a signal frame by frame
///
/// Parameters
/// ----------
/// signal : numpy.ndarray
///     Mono signal as a 1D float64 array
/// sample_rate : float
///     Signal sample rate in Hz
/// buffer_size : int
///     Samples per frame; trailing samples that do not fill a frame are ignored
/// unit : str
///     Pitch unit: "Hz" or "MIDI"
/// method : str
///     Estimator: "yin" or "yinfft"
/// time_unit : str
///     Time unit: "frames", "samples" or "seconds"
/// tolerance : float, optional
///     Estimator threshold; 0.15 for yin and 0.85 for yinfft when omitted
///
/// Returns
/// -------
/// tuple of numpy.ndarray
///     (time, pitch), one entry per frame; unvoiced frames are 0.0 in Hz
///     and NaN in MIDI
#[pyfunction]
#[pyo3(signature = (signal, sample_rate, buffer_size=2048, unit="Hz", method="yinfft", time_unit="seconds", tolerance=None))]
fn detect_pitch<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate: f64,
    buffer_size: usize,
    unit: &str,
    method: &str,
    time_unit: &str,
    tolerance: Option<f64>,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
    let options = DetectOptions::from_names(buffer_size, unit, method, time_unit, tolerance)
        .map_err(to_py_err)?;
    let samples = signal_samples(signal.as_array());
    let track = rust_detect_pitch(&samples, sample_rate, &options).map_err(to_py_err)?;
    Ok(track_to_arrays(py, track))
}

/// pitch_track: frame-based fundamental frequency tracking
///
/// Functions:
/// - detect_pitch: per-frame pitch of a numpy signal with YIN or YIN-FFT
///
/// Classes:
/// - Sound: audio samples loaded from a file or an array
#[pymodule]
fn pitch_track(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySound>()?;
    m.add_function(wrap_pyfunction!(detect_pitch, m)?)?;
    Ok(())
}
