//! Biometric Sampler
//!
//! Per-frame orchestration of the rPPG pipeline:
//! - Frame reduction to a green-channel sample
//! - Sliding sample buffer with timestamp-derived sampling rate
//! - Baseline removal + bandpass over the whole window (filter reset each pass)
//! - Peak-based BPM, EMA smoothing, drifting session baseline
//! - Stress classification, quality scoring and a throttled publish
//!
//! One sampler is one monitoring session. Nothing is shared between instances.

use super::buffer::{Sample, SampleBuffer};
use super::reading::{BiometricReading, ReadingSink};
use crate::config::{ConfigError, MirrorConfig};
use crate::dsp::{
    remove_rolling_baseline, smooth_bpm, Baseline, BandpassCoefficients, BandpassFilter, BpmEstimator, BpmOutcome,
    SignalQualityAnalyzer,
};
use crate::error::SignalError;
use crate::stress::{StressAssessment, StressClassifier};
use crate::vision::FrameView;

use ndarray::Array1;

/// Biometric Sampler
pub struct BiometricSampler {
    config: MirrorConfig,

    /// Sliding window of reduced frames
    buffer: SampleBuffer,

    filter: BandpassFilter,
    estimator: BpmEstimator,
    quality: SignalQualityAnalyzer,
    classifier: StressClassifier,
    baseline: Baseline,

    /// Last accepted smoothed BPM
    smoothed_bpm: Option<f32>,
    /// Set when a valid estimate arrives, cleared when the baseline absorbs it
    accepted_since_publish: bool,
    last_outcome: Option<BpmOutcome>,
    last_assessment: Option<StressAssessment>,
    last_publish_ms: Option<i64>,

    sink: Option<Box<dyn ReadingSink>>,

    /// Frames accepted this session
    frame_count: usize,
}

impl BiometricSampler {
    /// Sampler with default configuration (30 fps cardiac band).
    pub fn new() -> Self {
        let config = MirrorConfig::default();
        Self::build(config, BandpassFilter::new())
    }

    /// Sampler with custom configuration. The bandpass is designed for
    /// `sampler.target_fps`.
    pub fn with_config(config: MirrorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let coeffs = BandpassCoefficients::design(
            config.sampler.target_fps,
            config.dsp.band_low_hz,
            config.dsp.band_high_hz,
        )
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(Self::build(config, BandpassFilter::with_coefficients(coeffs)))
    }

    fn build(config: MirrorConfig, filter: BandpassFilter) -> Self {
        Self {
            buffer: SampleBuffer::new(config.sampler.max_samples),
            filter,
            estimator: BpmEstimator::with_config(config.bpm_estimator_config()),
            quality: SignalQualityAnalyzer::with_config(config.quality_config()),
            classifier: StressClassifier::with_config(config.stress_config()),
            baseline: Baseline::with_retention(config.stress.baseline_retention),
            smoothed_bpm: None,
            accepted_since_publish: false,
            last_outcome: None,
            last_assessment: None,
            last_publish_ms: None,
            sink: None,
            frame_count: 0,
            config,
        }
    }

    /// Install the consumer that receives every published reading.
    pub fn set_sink<S: ReadingSink + 'static>(&mut self, sink: S) {
        self.sink = Some(Box::new(sink));
    }

    /// Process one camera frame captured at `timestamp_ms`.
    ///
    /// Returns the reading when this frame triggers a publish.
    pub fn push_frame(&mut self, frame: &FrameView<'_>, timestamp_ms: i64) -> Result<Option<BiometricReading>, SignalError> {
        let value = frame.green_mean(self.config.sampler.pixel_stride);
        self.push_sample(value, timestamp_ms)
    }

    /// Process an already-reduced green sample.
    ///
    /// Use this when reduction happens upstream (e.g. on-device ROI averaging).
    pub fn push_sample(&mut self, value: f32, timestamp_ms: i64) -> Result<Option<BiometricReading>, SignalError> {
        if let Err(e) = self.buffer.push(Sample { value, timestamp_ms }) {
            log::warn!("Frame rejected: {}", e);
            return Err(e);
        }
        self.frame_count += 1;

        if self.buffer.len() < self.config.sampler.min_samples {
            return Ok(None);
        }

        let filtered = self.filter_window();
        self.update_estimate(&filtered);

        let smoothed = match self.smoothed_bpm {
            Some(bpm) => bpm,
            None => return Ok(None),
        };

        if let Some(last) = self.last_publish_ms {
            if timestamp_ms - last < self.config.sampler.publish_interval_ms {
                return Ok(None);
            }
        }

        Ok(Some(self.publish(smoothed, &filtered, timestamp_ms)))
    }

    /// Detrend and bandpass the full buffer from a clean filter state.
    fn filter_window(&mut self) -> Array1<f32> {
        let ac = remove_rolling_baseline(&self.buffer.values(), self.config.dsp.detrend_window);
        self.filter.process_window(&ac)
    }

    fn update_estimate(&mut self, filtered: &Array1<f32>) {
        let outcome = match self.buffer.effective_sample_rate() {
            Some(fs) => self.estimator.analyze(filtered, fs),
            None => BpmOutcome::InsufficientData,
        };

        match outcome.bpm() {
            Some(raw) => {
                let next = match self.smoothed_bpm {
                    Some(prev) => smooth_bpm(raw, prev, self.config.bpm.smoothing_alpha),
                    None => raw,
                };
                self.smoothed_bpm = Some(next);
                self.accepted_since_publish = true;
            }
            None => {
                log::debug!("No BPM estimate ({:?}); keeping {:?}", outcome, self.smoothed_bpm);
            }
        }

        self.last_outcome = Some(outcome);
    }

    fn publish(&mut self, smoothed: f32, filtered: &Array1<f32>, timestamp_ms: i64) -> BiometricReading {
        let heart_rate = smoothed.round() as u32;

        // Classify against the baseline as it stood before this reading
        let baseline = self.baseline.value().unwrap_or(smoothed);
        let assessment = self.classifier.evaluate(heart_rate, baseline, timestamp_ms);
        self.last_assessment = Some(assessment);

        if self.accepted_since_publish {
            let established = self.baseline.is_established();
            let updated = self.baseline.update(smoothed);
            if !established {
                log::info!("Session baseline established at {:.1} BPM", updated);
            }
            self.accepted_since_publish = false;
        }

        let reading = BiometricReading {
            heart_rate,
            stress_level: assessment.level,
            signal_quality: self.quality.score(filtered),
            timestamp: timestamp_ms,
        };
        self.last_publish_ms = Some(timestamp_ms);

        log::trace!(
            "Published: hr={} stress={} quality={} ts={}",
            reading.heart_rate,
            reading.stress_level.as_str(),
            reading.signal_quality,
            reading.timestamp
        );

        if let Some(sink) = self.sink.as_mut() {
            sink.publish(&reading);
        }

        reading
    }

    /// Last accepted smoothed BPM.
    pub fn smoothed_bpm(&self) -> Option<f32> {
        self.smoothed_bpm
    }

    /// Session resting baseline, once established.
    pub fn baseline(&self) -> Option<f32> {
        self.baseline.value()
    }

    /// Outcome of the most recent estimation pass.
    pub fn last_outcome(&self) -> Option<BpmOutcome> {
        self.last_outcome
    }

    /// Stress assessment behind the most recent reading.
    pub fn last_assessment(&self) -> Option<StressAssessment> {
        self.last_assessment
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Sampling rate measured over the buffered timestamps.
    pub fn effective_sample_rate(&self) -> Option<f32> {
        self.buffer.effective_sample_rate()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// End the session: drop all buffered data, smoothing, baseline and hysteresis.
    ///
    /// The installed sink is kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.filter.reset();
        self.classifier.reset();
        self.baseline.reset();
        self.smoothed_bpm = None;
        self.accepted_since_publish = false;
        self.last_outcome = None;
        self.last_assessment = None;
        self.last_publish_ms = None;
        self.frame_count = 0;
    }
}

impl Default for BiometricSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const T0: i64 = 1_700_000_000_000;

    fn frame_ts(i: usize) -> i64 {
        T0 + (i as f64 * 1000.0 / 30.0).round() as i64
    }

    fn pulse(bpm: f32, i: usize) -> f32 {
        128.0 + 2.0 * (2.0 * PI * bpm / 60.0 * i as f32 / 30.0).sin()
    }

    #[test]
    fn test_sampler_creation() {
        let sampler = BiometricSampler::new();
        assert_eq!(sampler.buffer_len(), 0);
        assert_eq!(sampler.smoothed_bpm(), None);
        assert_eq!(sampler.baseline(), None);
    }

    #[test]
    fn test_nothing_before_min_samples() {
        let mut sampler = BiometricSampler::new();
        for i in 0..89 {
            assert_eq!(sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap(), None);
        }
        assert_eq!(sampler.last_outcome(), None);
    }

    #[test]
    fn test_buffer_bounded() {
        let mut sampler = BiometricSampler::new();
        for i in 0..400 {
            sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap();
        }
        assert_eq!(sampler.buffer_len(), 300);
        assert_eq!(sampler.frame_count(), 400);
    }

    #[test]
    fn test_first_reading_establishes_baseline() {
        let mut sampler = BiometricSampler::new();
        let mut first = None;
        for i in 0..120 {
            if let Some(r) = sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap() {
                first = Some(r);
                break;
            }
        }
        let reading = first.expect("a reading once the window fills");
        assert!((reading.heart_rate as i32 - 72).abs() <= 3);
        assert_eq!(reading.stress_level, crate::stress::StressLevel::Low);
        assert!(sampler.baseline().is_some());
    }

    #[test]
    fn test_regression_leaves_state() {
        let mut sampler = BiometricSampler::new();
        sampler.push_sample(128.0, T0 + 100).unwrap();
        let err = sampler.push_sample(128.0, T0).unwrap_err();
        assert!(matches!(err, SignalError::TimestampRegression { .. }));
        assert_eq!(sampler.buffer_len(), 1);
        assert_eq!(sampler.frame_count(), 1);
    }

    #[test]
    fn test_non_finite_sample_does_not_poison_window() {
        let mut sampler = BiometricSampler::new();
        for i in 0..150 {
            sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap();
        }
        let err = sampler.push_sample(f32::NAN, frame_ts(150)).unwrap_err();
        assert!(matches!(err, SignalError::NonFiniteSample(_)));
        assert_eq!(sampler.frame_count(), 150);

        // The next valid frames keep producing estimates
        for i in 151..190 {
            sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap();
        }
        assert!(matches!(sampler.last_outcome(), Some(BpmOutcome::Estimate(_))));
    }

    #[test]
    fn test_reset() {
        let mut sampler = BiometricSampler::new();
        for i in 0..150 {
            sampler.push_sample(pulse(72.0, i), frame_ts(i)).unwrap();
        }
        assert!(sampler.smoothed_bpm().is_some());

        sampler.reset();

        assert_eq!(sampler.buffer_len(), 0);
        assert_eq!(sampler.smoothed_bpm(), None);
        assert_eq!(sampler.baseline(), None);
        assert_eq!(sampler.last_assessment(), None);
        // Old timestamps are acceptable again after the session ends
        assert!(sampler.push_sample(128.0, T0).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MirrorConfig::default();
        config.sampler.target_fps = 4.0;
        assert!(BiometricSampler::with_config(config).is_err());
    }
}
