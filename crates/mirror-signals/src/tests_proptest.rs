use proptest::prelude::*;

/// Property-based tests for pipeline invariants under random input

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{remove_rolling_baseline, BandpassFilter, BpmEstimator};
    use crate::rppg::{BiometricSampler, Sample, SampleBuffer};
    use crate::stress::{StressClassifier, StressLevel, StressState};
    use crate::vision::FrameView;
    use ndarray::Array1;

    // =========================================================================
    // Frame reduction stays in pixel range
    // =========================================================================
    proptest! {
        #[test]
        fn test_green_mean_in_pixel_range(
            pixels in prop::collection::vec(any::<u8>(), 4..1024),
            stride in 1usize..8,
        ) {
            let pixel_count = pixels.len() / 4;
            let data = &pixels[..pixel_count * 4];
            let frame = FrameView::rgba(data, pixel_count as u32, 1).unwrap();

            let mean = frame.green_mean(stride);
            prop_assert!((0.0..=255.0).contains(&mean));
        }
    }

    // =========================================================================
    // Filter output stays finite
    // =========================================================================
    proptest! {
        #[test]
        fn test_bandpass_output_finite(
            signal in prop::collection::vec(prop::num::f32::NORMAL | prop::num::f32::ZERO, 0..600),
        ) {
            let mut filter = BandpassFilter::new();
            let out = filter.process_window(&Array1::from(signal.clone()));

            prop_assert_eq!(out.len(), signal.len());
            prop_assert!(out.iter().all(|v| v.is_finite()));
        }
    }

    proptest! {
        #[test]
        fn test_bandpass_reset_is_idempotent(
            warmup in prop::collection::vec(0f32..255f32, 0..100),
            signal in prop::collection::vec(0f32..255f32, 1..300),
        ) {
            let signal = Array1::from(signal);
            let mut filter = BandpassFilter::new();
            filter.filter_signal(&Array1::from(warmup));

            filter.reset();
            let first = filter.filter_signal(&signal);
            filter.reset();
            let second = filter.filter_signal(&signal);

            prop_assert_eq!(first, second);
        }
    }

    // =========================================================================
    // Detrending preserves shape
    // =========================================================================
    proptest! {
        #[test]
        fn test_detrend_preserves_length(
            signal in prop::collection::vec(prop::num::f32::NORMAL | prop::num::f32::ZERO, 0..400),
            window in 1usize..64,
        ) {
            let out = remove_rolling_baseline(&Array1::from(signal.clone()), window);
            prop_assert_eq!(out.len(), signal.len());
            prop_assert!(out.iter().all(|v| v.is_finite()));
            if let Some(first) = out.get(0) {
                prop_assert_eq!(*first, 0.0);
            }
        }
    }

    // =========================================================================
    // Accepted BPM is always plausible
    // =========================================================================
    proptest! {
        #[test]
        fn test_bpm_estimate_within_bounds(
            signal in prop::collection::vec(-5f32..5f32, 0..300),
            fs in 5f32..60f32,
        ) {
            let estimator = BpmEstimator::new();
            if let Some(bpm) = estimator.estimate(&Array1::from(signal), fs) {
                prop_assert!((40.0..=200.0).contains(&bpm));
            }
        }
    }

    // =========================================================================
    // Buffer capacity and ordering
    // =========================================================================
    proptest! {
        #[test]
        fn test_buffer_bounded_and_ordered(
            deltas in prop::collection::vec(0i64..100, 1..500),
            capacity in 1usize..300,
        ) {
            let mut buffer = SampleBuffer::new(capacity);
            let mut ts = 0;
            for d in deltas {
                ts += d;
                buffer.push(Sample { value: 128.0, timestamp_ms: ts }).unwrap();
                prop_assert!(buffer.len() <= capacity);
            }

            let stamps: Vec<i64> = buffer.iter().map(|s| s.timestamp_ms).collect();
            prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    // =========================================================================
    // Reset ends the session completely
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn test_reset_replays_identically(
            values in prop::collection::vec(100f32..140f32, 90..240),
            deltas in prop::collection::vec(20i64..50, 240),
        ) {
            let stream: Vec<(f32, i64)> = values
                .iter()
                .zip(deltas.iter().scan(0i64, |ts, d| { *ts += d; Some(*ts) }))
                .map(|(&v, ts)| (v, ts))
                .collect();

            let mut fresh = BiometricSampler::new();
            let expected: Vec<_> = stream.iter().map(|&(v, ts)| fresh.push_sample(v, ts).unwrap()).collect();

            let mut reused = BiometricSampler::new();
            for &(v, ts) in &stream {
                reused.push_sample(v, ts).unwrap();
            }
            reused.reset();
            let replayed: Vec<_> = stream.iter().map(|&(v, ts)| reused.push_sample(v, ts).unwrap()).collect();

            prop_assert_eq!(expected, replayed);
        }
    }

    // =========================================================================
    // Any reading below the clear threshold ends an episode
    // =========================================================================
    proptest! {
        #[test]
        fn test_below_clear_always_clears(
            baseline in 50u32..120,
            drop_fraction in 0.5f32..1.0,
        ) {
            let baseline = baseline as f32;
            let mut classifier = StressClassifier::new();
            let elevated = (baseline * 1.3).ceil() as u32;

            classifier.evaluate(elevated, baseline, 0);
            let confirmed = classifier.evaluate(elevated, baseline, 6_000);
            prop_assert!(confirmed.onset);

            let clear = baseline * 1.05;
            let bpm = ((clear - 1.0) * drop_fraction).floor() as u32;
            let after = classifier.evaluate(bpm, baseline, 7_000);

            prop_assert!(!after.flagged);
            prop_assert_eq!(after.level, StressLevel::Low);
            prop_assert_eq!(classifier.state(), StressState::Calm);
        }
    }
}
