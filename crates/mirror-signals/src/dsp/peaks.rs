//! Peak-based heart rate estimation
//!
//! Finds local maxima in the filtered pulse waveform and converts the mean
//! inter-peak spacing to beats per minute. The sampling rate passed in should
//! be the *effective* rate measured from frame timestamps, not the nominal one.

use ndarray::Array1;

/// BPM estimator configuration
#[derive(Debug, Clone)]
pub struct BpmEstimatorConfig {
    /// Shortest window that can yield an estimate (samples)
    pub min_signal_len: usize,
    /// A peak must rise above this value
    pub peak_threshold: f32,
    /// Lowest plausible heart rate
    pub min_bpm: f32,
    /// Highest plausible heart rate
    pub max_bpm: f32,
}

impl Default for BpmEstimatorConfig {
    fn default() -> Self {
        Self {
            min_signal_len: 30,
            peak_threshold: 1e-3,
            min_bpm: 40.0,
            max_bpm: 200.0,
        }
    }
}

/// Outcome of one estimation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BpmOutcome {
    /// Plausible heart rate in BPM
    Estimate(f32),
    /// Window shorter than `min_signal_len`, or no usable sampling rate
    InsufficientData,
    /// Fewer than two peaks found
    TooFewPeaks(usize),
    /// Computed rate fell outside `[min_bpm, max_bpm]` and was discarded
    Implausible(f32),
}

impl BpmOutcome {
    /// The accepted BPM, or `None` for every "no estimate" outcome.
    pub fn bpm(&self) -> Option<f32> {
        match *self {
            BpmOutcome::Estimate(bpm) => Some(bpm),
            _ => None,
        }
    }
}

/// BPM Estimator
#[derive(Debug, Clone, Default)]
pub struct BpmEstimator {
    config: BpmEstimatorConfig,
}

impl BpmEstimator {
    pub fn new() -> Self {
        Self::with_config(BpmEstimatorConfig::default())
    }

    pub fn with_config(config: BpmEstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BpmEstimatorConfig {
        &self.config
    }

    /// Heart rate from `signal` sampled at `sample_rate` Hz, if one can be trusted.
    pub fn estimate(&self, signal: &Array1<f32>, sample_rate: f32) -> Option<f32> {
        self.analyze(signal, sample_rate).bpm()
    }

    /// Like [`estimate`](Self::estimate) but reports why no estimate was produced.
    pub fn analyze(&self, signal: &Array1<f32>, sample_rate: f32) -> BpmOutcome {
        if signal.len() < self.config.min_signal_len || !(sample_rate.is_finite() && sample_rate > 0.0) {
            return BpmOutcome::InsufficientData;
        }

        let peaks = find_peaks(signal, self.config.peak_threshold);
        if peaks.len() < 2 {
            return BpmOutcome::TooFewPeaks(peaks.len());
        }

        // Mean of consecutive gaps telescopes to (last - first) / (count - 1)
        let span = (peaks[peaks.len() - 1] - peaks[0]) as f32;
        let mean_gap = span / (peaks.len() - 1) as f32;
        let bpm = 60.0 * sample_rate / mean_gap;

        if bpm.is_finite() && bpm >= self.config.min_bpm && bpm <= self.config.max_bpm {
            BpmOutcome::Estimate(bpm)
        } else {
            BpmOutcome::Implausible(bpm)
        }
    }
}

/// Indices of strict local maxima above `threshold`.
///
/// The first and last samples are never peaks (they lack a neighbour).
pub fn find_peaks(signal: &Array1<f32>, threshold: f32) -> Vec<usize> {
    let n = signal.len();
    if n < 3 {
        return Vec::new();
    }

    (1..n - 1)
        .filter(|&i| signal[i] > threshold && signal[i] > signal[i - 1] && signal[i] > signal[i + 1])
        .collect()
}
