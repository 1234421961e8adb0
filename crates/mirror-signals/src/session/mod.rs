//! Session-level aggregation of published readings.

mod timeline;

pub use timeline::{BiometricTimeline, RestingBaseline, SessionSummary, BASELINE_READINGS, STRESS_THRESHOLD_RATIO};
