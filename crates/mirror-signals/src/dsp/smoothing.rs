//! Exponential smoothing for heart rate
//!
//! Two time scales: a fast EMA that steadies frame-to-frame BPM estimates, and a
//! slow drifting baseline that tracks the user's resting rate over a session.

/// Weight of the newest raw estimate in [`smooth_bpm`].
pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.3;

/// Weight of the existing baseline on every update.
pub const DEFAULT_BASELINE_RETENTION: f32 = 0.98;

/// `alpha·current + (1 − alpha)·previous`.
///
/// Pure; the caller threads `previous` through. Rejected estimates must never
/// reach this function, otherwise a "no estimate" would drag the value down.
#[inline]
pub fn smooth_bpm(current: f32, previous: f32, alpha: f32) -> f32 {
    alpha * current + (1.0 - alpha) * previous
}

/// Slowly drifting resting heart rate.
///
/// Starts empty, takes the first accepted BPM verbatim, then blends each new
/// one in with weight `1 − retention`.
#[derive(Debug, Clone)]
pub struct Baseline {
    value: Option<f32>,
    retention: f32,
}

impl Baseline {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_BASELINE_RETENTION)
    }

    pub fn with_retention(retention: f32) -> Self {
        Self {
            value: None,
            retention: retention.clamp(0.0, 1.0),
        }
    }

    /// Current baseline, `None` until the first update.
    pub fn value(&self) -> Option<f32> {
        self.value
    }

    pub fn is_established(&self) -> bool {
        self.value.is_some()
    }

    /// Fold an accepted BPM into the baseline and return the new value.
    pub fn update(&mut self, bpm: f32) -> f32 {
        let next = match self.value {
            Some(prev) => self.retention * prev + (1.0 - self.retention) * bpm,
            None => bpm,
        };
        self.value = Some(next);
        next
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::new()
    }
}
