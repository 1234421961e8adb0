//! Sliding sample buffer
//!
//! Bounded FIFO of green-channel samples with non-decreasing timestamps.
//! Frame delivery jitters, so the buffer also reports the sampling rate the
//! samples actually arrived at.

use crate::error::SignalError;
use ndarray::Array1;
use std::collections::VecDeque;

/// One reduced frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Mean green value in [0, 255]
    pub value: f32,
    /// Capture time, milliseconds since epoch
    pub timestamp_ms: i64,
}

/// Capacity-bounded sample window; the oldest sample is evicted first.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting from the front once full.
    ///
    /// A NaN/infinite value, or a timestamp older than the newest buffered one,
    /// is rejected and the buffer is left untouched.
    pub fn push(&mut self, sample: Sample) -> Result<(), SignalError> {
        if !sample.value.is_finite() {
            return Err(SignalError::NonFiniteSample(sample.value));
        }
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                return Err(SignalError::TimestampRegression {
                    last_ms: last.timestamp_ms,
                    now_ms: sample.timestamp_ms,
                });
            }
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Sample values, oldest first.
    pub fn values(&self) -> Array1<f32> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// Milliseconds between the oldest and newest sample.
    pub fn span_ms(&self) -> i64 {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0,
        }
    }

    /// Samples per second measured over the buffered timestamps:
    /// `(n − 1)` intervals over the elapsed span. `None` with fewer than two
    /// samples or zero elapsed time.
    pub fn effective_sample_rate(&self) -> Option<f32> {
        let span = self.span_ms();
        if self.samples.len() < 2 || span <= 0 {
            return None;
        }
        Some((self.samples.len() - 1) as f32 * 1000.0 / span as f32)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(value: f32, timestamp_ms: i64) -> Sample {
        Sample { value, timestamp_ms }
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut buffer = SampleBuffer::new(3);
        for i in 0..5 {
            buffer.push(sample(i as f32, i * 10)).unwrap();
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.values().to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(buffer.span_ms(), 20);
    }

    #[test]
    fn test_regression_rejected_without_mutation() {
        let mut buffer = SampleBuffer::new(10);
        buffer.push(sample(1.0, 1_000)).unwrap();

        let err = buffer.push(sample(2.0, 999)).unwrap_err();
        assert_eq!(
            err,
            SignalError::TimestampRegression {
                last_ms: 1_000,
                now_ms: 999
            }
        );
        assert_eq!(buffer.len(), 1);

        // Equal timestamps are allowed
        assert!(buffer.push(sample(3.0, 1_000)).is_ok());
    }

    #[test]
    fn test_non_finite_rejected_without_mutation() {
        let mut buffer = SampleBuffer::new(10);
        buffer.push(sample(1.0, 0)).unwrap();

        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                buffer.push(sample(bad, 10)),
                Err(SignalError::NonFiniteSample(_))
            ));
        }
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.values().to_vec(), vec![1.0]);
    }

    #[test]
    fn test_effective_rate_from_jittered_timestamps() {
        let mut buffer = SampleBuffer::new(100);
        assert_eq!(buffer.effective_sample_rate(), None);

        // 25 fps nominal with alternating 35/45 ms gaps
        let mut ts = 0;
        for i in 0..51 {
            buffer.push(sample(0.0, ts)).unwrap();
            ts += if i % 2 == 0 { 35 } else { 45 };
        }
        assert_relative_eq!(buffer.effective_sample_rate().unwrap(), 25.0, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_span_has_no_rate() {
        let mut buffer = SampleBuffer::new(10);
        buffer.push(sample(0.0, 5)).unwrap();
        buffer.push(sample(0.0, 5)).unwrap();
        assert_eq!(buffer.effective_sample_rate(), None);
    }
}
