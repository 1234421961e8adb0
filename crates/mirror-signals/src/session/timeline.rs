//! Biometric timeline
//!
//! Every reading published during one session, in order, plus the summary
//! statistics a coaching report needs.

use crate::rppg::{BiometricReading, ReadingSink};
use crate::stress::StressLevel;
use serde::{Deserialize, Serialize};

/// Readings averaged into the resting baseline
pub const BASELINE_READINGS: usize = 10;

/// Resting multiple reported as the stress threshold
pub const STRESS_THRESHOLD_RATIO: f32 = 1.2;

/// Resting heart rate taken from the opening readings of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestingBaseline {
    pub resting_heart_rate: f32,
    pub stress_threshold: f32,
}

/// Summary of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub reading_count: usize,
    /// Milliseconds between the first and last reading
    pub duration_ms: i64,
    pub average_heart_rate: Option<f32>,
    pub resting_baseline: Option<RestingBaseline>,
    /// Readings published at `high` stress
    pub stress_events: usize,
    /// Lowest heart rate of the session
    pub calmest: Option<BiometricReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BiometricTimeline {
    readings: Vec<BiometricReading>,
}

impl BiometricTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, reading: BiometricReading) {
        self.readings.push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn latest(&self) -> Option<&BiometricReading> {
        self.readings.last()
    }

    pub fn readings(&self) -> &[BiometricReading] {
        &self.readings
    }

    /// Average of the first [`BASELINE_READINGS`] heart rates.
    ///
    /// `None` until that many readings exist; fixed afterwards.
    pub fn resting_baseline(&self) -> Option<RestingBaseline> {
        if self.readings.len() < BASELINE_READINGS {
            return None;
        }
        let sum: u32 = self.readings[..BASELINE_READINGS].iter().map(|r| r.heart_rate).sum();
        let resting = sum as f32 / BASELINE_READINGS as f32;
        Some(RestingBaseline {
            resting_heart_rate: resting,
            stress_threshold: resting * STRESS_THRESHOLD_RATIO,
        })
    }

    pub fn stress_events(&self) -> usize {
        self.readings.iter().filter(|r| r.stress_level == StressLevel::High).count()
    }

    /// Reading with the lowest heart rate; the earliest wins a tie.
    pub fn calmest(&self) -> Option<&BiometricReading> {
        self.readings
            .iter()
            .reduce(|best, r| if r.heart_rate < best.heart_rate { r } else { best })
    }

    pub fn average_heart_rate(&self) -> Option<f32> {
        if self.readings.is_empty() {
            return None;
        }
        let sum: u64 = self.readings.iter().map(|r| r.heart_rate as u64).sum();
        Some(sum as f32 / self.readings.len() as f32)
    }

    pub fn duration_ms(&self) -> i64 {
        match (self.readings.first(), self.readings.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            reading_count: self.readings.len(),
            duration_ms: self.duration_ms(),
            average_heart_rate: self.average_heart_rate(),
            resting_baseline: self.resting_baseline(),
            stress_events: self.stress_events(),
            calmest: self.calmest().copied(),
        }
    }

    /// Export the full timeline as a JSON array of readings.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.readings)
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }
}

impl ReadingSink for BiometricTimeline {
    fn publish(&mut self, reading: &BiometricReading) {
        self.record(*reading);
    }
}
