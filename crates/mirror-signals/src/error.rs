//! Error types for frame ingestion and filter design.
//!
//! Degraded-data states (short buffer, too few peaks, implausible BPM) are not
//! errors: they surface as `None` from the estimator and the sampler simply keeps
//! reporting its last good value.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("frame buffer is empty")]
    EmptyFrame,
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },
    #[error("pixel layout with {0} channel(s) has no green channel")]
    UnsupportedChannels(usize),
    #[error("non-finite sample value {0}")]
    NonFiniteSample(f32),
    #[error("timestamp regression: now={now_ms}ms < last={last_ms}ms")]
    TimestampRegression { last_ms: i64, now_ms: i64 },
    #[error("invalid filter design: {0}")]
    InvalidFilterDesign(String),
}
