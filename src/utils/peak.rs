//! Peak picking helpers shared by the YIN estimators

/// Index of the first smallest value, 0 for an empty slice
pub fn min_index(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < values[best] {
            best = i;
        }
    }
    best
}

/// Refine an extremum position with a parabola through its neighbours
///
/// Positions on either boundary cannot be refined and are returned as-is,
/// as is any position where the three points are collinear.
pub fn quadratic_peak_pos(values: &[f64], pos: usize) -> f64 {
    if pos == 0 || pos + 1 >= values.len() {
        return pos as f64;
    }
    let s0 = values[pos - 1];
    let s1 = values[pos];
    let s2 = values[pos + 1];
    let denominator = s0 - 2.0 * s1 + s2;
    if denominator == 0.0 {
        return pos as f64;
    }
    pos as f64 + 0.5 * (s0 - s2) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_min_index_first_of_ties() {
        assert_eq!(min_index(&[3.0, 1.0, 2.0, 1.0]), 1);
        assert_eq!(min_index(&[1.0, 1.0, 1.0]), 0);
        assert_eq!(min_index(&[]), 0);
    }

    #[test]
    fn test_quadratic_exact_parabola() {
        // y = (x - 2.3)^2 sampled at integers
        let values: Vec<f64> = (0..5).map(|x| (x as f64 - 2.3).powi(2)).collect();
        assert_relative_eq!(quadratic_peak_pos(&values, 2), 2.3, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_boundaries_and_flat() {
        let values = [1.0, 0.5, 0.2];
        assert_eq!(quadratic_peak_pos(&values, 0), 0.0);
        assert_eq!(quadratic_peak_pos(&values, 2), 2.0);
        assert_eq!(quadratic_peak_pos(&[1.0, 1.0, 1.0], 1), 1.0);
    }
}
