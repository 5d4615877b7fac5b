//! Analysis windows
//!
//! Windows here are periodic: an `N`-point window is one period of the
//! `N`-point DFT, which is what FFT-based difference functions expect.

use std::f64::consts::TAU;

/// Periodic Hann window, `0.5 - 0.5 cos(2 pi i / size)`
pub fn hann(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (TAU * i as f64 / size as f64).cos())
        .collect()
}

/// Multiply `input` by `window` sample by sample
///
/// The result is as long as the shorter of the two.
pub fn apply_window(input: &[f64], window: &[f64]) -> Vec<f64> {
    input.iter().zip(window).map(|(x, w)| x * w).collect()
}
