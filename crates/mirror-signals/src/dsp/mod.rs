//! DSP (Digital Signal Processing) module
//!
//! The numeric stages between a raw green-channel trace and a heart rate:
//! - `remove_rolling_baseline` - causal DC removal
//! - `BandpassFilter` - cardiac-band biquad
//! - `BpmEstimator` - peak spacing to BPM with a plausibility gate
//! - `smooth_bpm` / `Baseline` - short and long time-scale smoothing
//! - `SignalQualityAnalyzer` - variance-derived quality score

mod detrend;
mod filters;
mod peaks;
mod signal_quality;
mod smoothing;

pub use detrend::remove_rolling_baseline;
pub use filters::{BandpassCoefficients, BandpassFilter, CARDIAC_30HZ};
pub use peaks::{find_peaks, BpmEstimator, BpmEstimatorConfig, BpmOutcome};
pub use signal_quality::{SignalQualityAnalyzer, SignalQualityConfig};
pub use smoothing::{smooth_bpm, Baseline, DEFAULT_BASELINE_RETENTION, DEFAULT_SMOOTHING_ALPHA};
