//! Published biometric reading and the consumer seam.

use crate::stress::StressLevel;
use serde::{Deserialize, Serialize};

/// Periodic structured sample handed to the session backend.
///
/// Serializes as `{ "heartRate", "stressLevel", "signalQuality", "timestamp" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricReading {
    /// Rounded smoothed heart rate (BPM)
    pub heart_rate: u32,
    pub stress_level: StressLevel,
    /// Heuristic quality score, 0-100
    pub signal_quality: u8,
    /// Epoch milliseconds of the frame that triggered publication
    pub timestamp: i64,
}

impl BiometricReading {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Consumer of published readings (UI, transport to the AI backend, ...).
pub trait ReadingSink: Send {
    fn publish(&mut self, reading: &BiometricReading);
}

impl<F> ReadingSink for F
where
    F: FnMut(&BiometricReading) + Send,
{
    fn publish(&mut self, reading: &BiometricReading) {
        self(reading)
    }
}
