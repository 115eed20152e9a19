//! Loudness measurement
//!
//! The host-side primitive behind [`crate::host::Host::measure`]: the
//! linear gain that would bring a source's RMS level to full scale.

/// Convert linear amplitude to decibels
///
/// Returns -f64::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Linear RMS over every sample of every channel. 0.0 for empty input.
pub fn calculate_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Gain that normalizes `samples` to an RMS of 1.0 (0 dBFS).
///
/// Silence needs infinite gain.
pub fn normalization_gain(samples: &[f32]) -> f64 {
    let rms = calculate_rms(samples);
    if rms <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / rms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rms_unity() {
        assert_relative_eq!(calculate_rms(&[1.0, -1.0, 1.0, -1.0]), 1.0);
    }

    #[test]
    fn test_rms_empty() {
        assert_eq!(calculate_rms(&[]), 0.0);
    }

    #[test]
    fn test_gain_of_half_scale() {
        assert_relative_eq!(normalization_gain(&[0.5, -0.5]), 2.0);
        assert_relative_eq!(linear_to_db(normalization_gain(&[0.5, -0.5])), 6.0206, epsilon = 1e-3);
    }

    #[test]
    fn test_gain_of_silence() {
        assert!(normalization_gain(&[0.0; 16]).is_infinite());
        assert!(linear_to_db(0.0).is_infinite());
    }

    #[test]
    fn test_quieter_needs_more_gain() {
        let quiet = normalization_gain(&[0.1, -0.1, 0.1]);
        let loud = normalization_gain(&[0.8, -0.8, 0.8]);
        assert!(quiet > loud);
    }
}
