//! Fixed-size, non-overlapping frame segmentation
//!
//! A signal of `L` samples analysed with frames of `B` samples produces
//! `floor(L / B)` frames. Trailing samples that do not fill a whole frame are
//! dropped.

use std::iter::FusedIterator;

/// Number of complete frames of `buffer_size` samples in `signal_len` samples
pub fn frame_count(signal_len: usize, buffer_size: usize) -> usize {
    if buffer_size == 0 {
        0
    } else {
        signal_len / buffer_size
    }
}

/// Iterator over consecutive frames of a signal
///
/// Cloning the iterator restarts iteration from the clone's position, so the
/// same signal can be walked several times without copying samples.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    signal: &'a [f64],
    buffer_size: usize,
    start: usize,
}

impl<'a> Frames<'a> {
    /// Segment `signal` into frames of `buffer_size` samples
    ///
    /// A zero `buffer_size` or an empty signal yields no frames.
    pub fn new(signal: &'a [f64], buffer_size: usize) -> Self {
        Self {
            signal,
            buffer_size,
            start: 0,
        }
    }

    /// Frame length in samples
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn remaining(&self) -> usize {
        frame_count(self.signal.len() - self.start, self.buffer_size)
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a [f64];

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer_size == 0 {
            return None;
        }
        let stop = self.start + self.buffer_size;
        if stop > self.signal.len() {
            return None;
        }
        let frame = &self.signal[self.start..stop];
        self.start = stop;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Frames<'_> {}

impl FusedIterator for Frames<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_frames() {
        let signal: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let frames: Vec<&[f64]> = Frames::new(&signal, 4).collect();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(frames[2], &[8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn test_partial_frame_dropped() {
        let signal: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let frames = Frames::new(&signal, 4);

        assert_eq!(frames.len(), 2);
        let last = frames.last().unwrap();
        assert_eq!(last, &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(Frames::new(&[], 4).count(), 0);
        assert_eq!(Frames::new(&[1.0, 2.0], 0).count(), 0);
        assert_eq!(Frames::new(&[1.0, 2.0], 3).count(), 0);
        assert_eq!(frame_count(100, 0), 0);
    }

    #[test]
    fn test_restartable() {
        let signal = vec![0.5; 9];
        let frames = Frames::new(&signal, 3);
        let again = frames.clone();

        assert_eq!(again.buffer_size(), 3);
        assert_eq!(frames.count(), 3);
        assert_eq!(again.count(), 3);
    }

    #[test]
    fn test_size_hint_tracks_progress() {
        let signal = vec![0.0; 10];
        let mut frames = Frames::new(&signal, 3);

        assert_eq!(frames.len(), 3);
        frames.next();
        assert_eq!(frames.len(), 2);
        frames.next();
        frames.next();
        assert_eq!(frames.len(), 0);
        assert!(frames.next().is_none());
    }
}
