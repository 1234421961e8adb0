//! Rolling baseline removal
//!
//! Strips the slow DC / ambient-light component from the green trace by
//! subtracting a trailing moving average, leaving the pulsatile AC part.
//!
//! The average is causal: sample `i` only sees `signal[i - window ..= i]`
//! (clamped at the start of the buffer), so the same function works on a
//! growing stream without peeking ahead.

use ndarray::Array1;

/// Subtract the trailing mean of the last `window` samples (plus the current one).
///
/// Output length always equals input length. Near the start of the buffer the
/// window shrinks to the available prefix, so `output[0]` is always 0.
pub fn remove_rolling_baseline(signal: &Array1<f32>, window: usize) -> Array1<f32> {
    let n = signal.len();
    let mut result = Array1::zeros(n);

    // Running sum in f64 so long buffers don't accumulate f32 drift.
    let mut sum = 0.0f64;
    for i in 0..n {
        sum += signal[i] as f64;
        if i > window {
            sum -= signal[i - window - 1] as f64;
        }

        let start = i.saturating_sub(window);
        let mean = sum / (i - start + 1) as f64;
        result[i] = ((signal[i] as f64 - mean) as f32).clamp(f32::MIN, f32::MAX);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_length_preserved() {
        for n in [0usize, 1, 5, 64] {
            let signal = Array1::from_elem(n, 3.0f32);
            assert_eq!(remove_rolling_baseline(&signal, 10).len(), n);
        }
    }

    #[test]
    fn test_constant_signal_goes_flat() {
        let signal = Array1::from_elem(120, 128.0f32);
        let ac = remove_rolling_baseline(&signal, 30);
        assert!(ac.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_matches_direct_window_mean() {
        let signal: Array1<f32> = (0..40).map(|i| (i * i % 17) as f32).collect();
        let window = 6;
        let ac = remove_rolling_baseline(&signal, window);

        for i in 0..signal.len() {
            let start = i.saturating_sub(window);
            let slice = signal.slice(ndarray::s![start..=i]);
            let mean = slice.sum() / slice.len() as f32;
            assert_relative_eq!(ac[i], signal[i] - mean, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_short_input_uses_prefix() {
        let signal = Array1::from(vec![2.0f32, 4.0, 6.0]);
        let ac = remove_rolling_baseline(&signal, 30);
        assert_relative_eq!(ac[0], 0.0);
        assert_relative_eq!(ac[1], 1.0);
        assert_relative_eq!(ac[2], 2.0);
    }

    #[test]
    fn test_removes_linear_drift_offset() {
        // Pulse riding on a slow ramp: after removal the ramp offset is gone
        let signal: Array1<f32> = (0..150)
            .map(|i| {
                let t = i as f32 / 30.0;
                100.0 + 5.0 * t + (2.0 * PI * 1.2 * t).sin()
            })
            .collect();
        let ac = remove_rolling_baseline(&signal, 30);
        let tail_mean = ac.slice(ndarray::s![60..]).mean().unwrap();
        // Trailing window lags a linear ramp by half its span: 5 units/s * 0.5 s
        assert!((tail_mean - 2.5).abs() < 0.3, "tail mean {}", tail_mean);
        assert!(ac.iter().all(|v| v.abs() < 5.0));
    }

    #[test]
    fn test_extreme_values_stay_finite() {
        let signal = Array1::from(vec![-f32::MAX, -f32::MAX, f32::MAX]);
        let ac = remove_rolling_baseline(&signal, 30);
        assert!(ac.iter().all(|v| v.is_finite()));
        assert_eq!(ac[2], f32::MAX);
    }
}
