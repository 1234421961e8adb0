//! Signal quality scoring
//!
//! Heuristic 0-100 score for the published reading. A visible pulse shows up as
//! AC energy in the filtered window, so more variance maps to a higher score.
//! The mapping is a tunable, not a calibrated measure.

use ndarray::{s, Array1};

/// Configuration for quality scoring
#[derive(Debug, Clone)]
pub struct SignalQualityConfig {
    /// Number of most recent filtered samples considered
    pub window: usize,
    /// Score reported for a window with no AC energy
    pub floor: u8,
    /// Upper bound of the score
    pub ceiling: u8,
    /// Score points per unit of variance
    pub variance_gain: f32,
}

impl Default for SignalQualityConfig {
    fn default() -> Self {
        Self {
            window: 90,
            floor: 60,
            ceiling: 100,
            variance_gain: 40.0,
        }
    }
}

/// Signal Quality Analyzer
#[derive(Debug, Clone, Default)]
pub struct SignalQualityAnalyzer {
    config: SignalQualityConfig,
}

impl SignalQualityAnalyzer {
    pub fn new() -> Self {
        Self::with_config(SignalQualityConfig::default())
    }

    pub fn with_config(config: SignalQualityConfig) -> Self {
        Self { config }
    }

    /// Population variance of the trailing window.
    pub fn window_variance(&self, filtered: &Array1<f32>) -> f32 {
        let n = filtered.len();
        if n == 0 {
            return 0.0;
        }

        let start = n.saturating_sub(self.config.window.max(1));
        let recent = filtered.slice(s![start..]);
        let mean = recent.mean().unwrap_or(0.0);
        recent.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / recent.len() as f32
    }

    /// Quality score clamped into `[floor, ceiling]`.
    pub fn score(&self, filtered: &Array1<f32>) -> u8 {
        let floor = self.config.floor as f32;
        let ceiling = self.config.ceiling as f32;
        let variance = self.window_variance(filtered);

        if !variance.is_finite() {
            return self.config.floor;
        }

        (floor + variance * self.config.variance_gain)
            .clamp(floor, ceiling)
            .round() as u8
    }
}
