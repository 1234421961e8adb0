//! rPPG (Remote Photoplethysmography) module
//!
//! Turns a stream of camera frames into periodic biometric readings.
//! [`BiometricSampler`] owns one session's state; readings leave through
//! its return value and through an optional [`ReadingSink`].

mod buffer;
mod reading;
mod sampler;

pub use buffer::{Sample, SampleBuffer};
pub use reading::{BiometricReading, ReadingSink};
pub use sampler::BiometricSampler;
