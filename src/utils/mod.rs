//! Utility modules for signal processing
//!
//! This module contains low-level signal processing utilities used by
//! the estimators.

pub mod fft;
pub mod peak;

pub use fft::Fft;
pub use peak::{min_index, quadratic_peak_pos};
