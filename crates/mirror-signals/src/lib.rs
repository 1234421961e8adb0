//! # mirror-signals
//!
//! Camera-based biometric sampling for the mirror coaching app.
//!
//! This crate provides:
//! - **rPPG pipeline**: green-channel reduction, detrending, cardiac bandpass and
//!   peak-based heart rate from a live frame stream
//! - **Stress classification**: hysteretic low/medium/high levels relative to a
//!   drifting session baseline
//! - **Session timeline**: resting baseline, stress events and summary export
//!
//! ## Example
//!
//! ```ignore
//! use mirror_signals::{BiometricSampler, FrameView};
//!
//! let mut sampler = BiometricSampler::new();
//! sampler.set_sink(|reading: &mirror_signals::BiometricReading| {
//!     println!("{}", reading.to_json().unwrap_or_default());
//! });
//!
//! for (pixels, ts_ms) in camera_frames {
//!     let frame = FrameView::rgba(&pixels, 640, 480)?;
//!     sampler.push_frame(&frame, ts_ms)?;
//! }
//! ```

pub mod config;
pub mod dsp;
pub mod error;
pub mod rppg;
pub mod session;
pub mod stress;
pub mod vision;

#[cfg(test)]
mod tests_proptest;

pub use config::{ConfigError, MirrorConfig};
pub use error::SignalError;
pub use rppg::{BiometricReading, BiometricSampler, ReadingSink};
pub use session::{BiometricTimeline, SessionSummary};
pub use stress::{StressAssessment, StressClassifier, StressLevel, StressState};
pub use vision::FrameView;
