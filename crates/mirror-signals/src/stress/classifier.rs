//! Hysteretic stress classification
//!
//! Three-state machine over smoothed BPM relative to the session baseline:
//!
//! ```text
//!            bpm > high                   bpm > high for > min_sustain
//!   Calm ─────────────────▶ Rising ─────────────────────────────▶ Stressed
//!    ▲                        │                                      │
//!    └──── bpm < clear ───────┴───────────── bpm < clear ◀───────────┘
//! ```
//!
//! `high = baseline × high_ratio` (1.20), `clear = baseline × clear_ratio` (1.05).
//! Entering needs a large, sustained excursion; leaving needs a material drop.
//! Between the two thresholds the current state is held, and a Rising timer
//! keeps running from its original start.

use serde::{Deserialize, Serialize};

/// Published stress level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "low",
            StressLevel::Medium => "medium",
            StressLevel::High => "high",
        }
    }
}

/// Classifier phase, derived from [`HysteresisState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressState {
    Calm,
    Rising,
    Stressed,
}

/// Persistent per-session hysteresis bookkeeping.
///
/// `start_time_ms` is set only while a provisional episode is being timed or
/// while `is_stressed` holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HysteresisState {
    pub is_stressed: bool,
    pub start_time_ms: Option<i64>,
}

impl HysteresisState {
    pub fn state(&self) -> StressState {
        match (self.is_stressed, self.start_time_ms) {
            (true, _) => StressState::Stressed,
            (false, Some(_)) => StressState::Rising,
            (false, None) => StressState::Calm,
        }
    }

    fn clear(&mut self) {
        self.is_stressed = false;
        self.start_time_ms = None;
    }
}

/// Stress classifier configuration
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Baseline multiple that starts an episode
    pub high_ratio: f32,
    /// Baseline multiple below which any episode ends
    pub clear_ratio: f32,
    /// An episode must stay above `high` for strictly longer than this
    pub min_sustain_ms: i64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            high_ratio: 1.20,
            clear_ratio: 1.05,
            min_sustain_ms: 5_000,
        }
    }
}

/// Result of one classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressAssessment {
    pub level: StressLevel,
    /// True on confirmation and on every reading while stressed.
    pub flagged: bool,
    /// True only on the reading that confirmed the episode.
    pub onset: bool,
    pub state: StressState,
}

/// Classify one smoothed BPM reading, mutating `hysteresis` in place.
///
/// Pure apart from `hysteresis`, so several sessions can run side by side with
/// their own state.
pub fn classify(
    bpm: u32,
    baseline: f32,
    now_ms: i64,
    hysteresis: &mut HysteresisState,
    config: &StressConfig,
) -> StressAssessment {
    let bpm = bpm as f32;
    let high = baseline * config.high_ratio;
    let clear = baseline * config.clear_ratio;
    let before = hysteresis.state();
    let mut onset = false;

    match before {
        StressState::Stressed => {
            if bpm < clear {
                hysteresis.clear();
            }
        }
        StressState::Rising => {
            if bpm > high {
                let started = hysteresis.start_time_ms.unwrap_or(now_ms);
                if now_ms.saturating_sub(started) > config.min_sustain_ms {
                    hysteresis.is_stressed = true;
                    onset = true;
                }
            } else if bpm < clear {
                hysteresis.clear();
            }
        }
        StressState::Calm => {
            if bpm > high {
                hysteresis.start_time_ms = Some(now_ms);
            }
        }
    }

    let after = hysteresis.state();
    if after != before {
        log::debug!(
            "Stress: {:?} -> {:?} (bpm={:.0}, high={:.1}, clear={:.1})",
            before,
            after,
            bpm,
            high,
            clear
        );
    }
    if onset {
        log::info!("Stress episode confirmed at {}ms (bpm={:.0}, baseline={:.1})", now_ms, bpm, baseline);
    }

    let level = if hysteresis.is_stressed {
        StressLevel::High
    } else if bpm >= clear {
        StressLevel::Medium
    } else {
        StressLevel::Low
    };

    StressAssessment {
        level,
        flagged: hysteresis.is_stressed,
        onset,
        state: after,
    }
}

/// Stress Classifier
///
/// Owns one session's [`HysteresisState`].
#[derive(Debug, Clone, Default)]
pub struct StressClassifier {
    config: StressConfig,
    hysteresis: HysteresisState,
}

impl StressClassifier {
    pub fn new() -> Self {
        Self::with_config(StressConfig::default())
    }

    pub fn with_config(config: StressConfig) -> Self {
        Self {
            config,
            hysteresis: HysteresisState::default(),
        }
    }

    pub fn evaluate(&mut self, bpm: u32, baseline: f32, now_ms: i64) -> StressAssessment {
        classify(bpm, baseline, now_ms, &mut self.hysteresis, &self.config)
    }

    pub fn state(&self) -> StressState {
        self.hysteresis.state()
    }

    pub fn hysteresis(&self) -> &HysteresisState {
        &self.hysteresis
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.hysteresis = HysteresisState::default();
    }
}
