use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::dsp::{BpmEstimatorConfig, SignalQualityConfig};
use crate::stress::StressConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub dsp: DspConfig,
    #[serde(default)]
    pub bpm: BpmConfig,
    #[serde(default)]
    pub stress: StressSection,
    #[serde(default)]
    pub quality: QualitySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Frame rate the bandpass coefficients are designed for (Hz)
    pub target_fps: f32,
    /// Buffered samples required before any estimate is attempted
    pub min_samples: usize,
    /// Sliding window capacity
    pub max_samples: usize,
    /// Minimum spacing between published readings
    pub publish_interval_ms: i64,
    /// Visit every Nth pixel when reducing a frame
    pub pixel_stride: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DspConfig {
    /// Trailing moving-average window for baseline removal (samples)
    pub detrend_window: usize,
    pub band_low_hz: f32,
    pub band_high_hz: f32,
    /// Peaks must exceed this amplitude
    pub peak_threshold: f32,
    /// Shortest filtered window that may yield a BPM
    pub min_signal_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BpmConfig {
    pub min_bpm: f32,
    pub max_bpm: f32,
    /// Weight of each new estimate in the BPM EMA
    pub smoothing_alpha: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressSection {
    pub high_ratio: f32,
    pub clear_ratio: f32,
    pub min_sustain_ms: i64,
    /// Weight of the existing baseline when a new BPM is folded in
    pub baseline_retention: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySection {
    pub window: usize,
    pub floor: u8,
    pub ceiling: u8,
    pub variance_gain: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_fps: 30.0,
            min_samples: 90,  // 3 s at 30 fps
            max_samples: 300, // 10 s at 30 fps
            publish_interval_ms: 1_000,
            pixel_stride: 4,
        }
    }
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            detrend_window: 30,
            band_low_hz: 0.7,
            band_high_hz: 3.0,
            peak_threshold: 1e-3,
            min_signal_len: 30,
        }
    }
}

impl Default for BpmConfig {
    fn default() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 200.0,
            smoothing_alpha: 0.3,
        }
    }
}

impl Default for StressSection {
    fn default() -> Self {
        Self {
            high_ratio: 1.20,
            clear_ratio: 1.05,
            min_sustain_ms: 5_000,
            baseline_retention: 0.98,
        }
    }
}

impl Default for QualitySection {
    fn default() -> Self {
        Self {
            window: 90,
            floor: 60,
            ceiling: 100,
            variance_gain: 40.0,
        }
    }
}

impl MirrorConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: MirrorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with MIRROR_
    /// Example: MIRROR_STRESS_HIGH_RATIO=1.25
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(default_path: Option<&Path>, user_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = MirrorConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // User file wins outright; sections it omits fall back to built-in defaults
        if let Some(path) = user_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        fn read<T: std::str::FromStr>(key: &str, target: &mut T) -> Result<(), ConfigError> {
            if let Ok(val) = std::env::var(key) {
                *target = val
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Validation(format!("Invalid {}", key)))?;
            }
            Ok(())
        }

        // Sampler overrides
        read("MIRROR_SAMPLER_TARGET_FPS", &mut self.sampler.target_fps)?;
        read("MIRROR_SAMPLER_MIN_SAMPLES", &mut self.sampler.min_samples)?;
        read("MIRROR_SAMPLER_MAX_SAMPLES", &mut self.sampler.max_samples)?;
        read("MIRROR_SAMPLER_PUBLISH_INTERVAL_MS", &mut self.sampler.publish_interval_ms)?;
        read("MIRROR_SAMPLER_PIXEL_STRIDE", &mut self.sampler.pixel_stride)?;

        // DSP overrides
        read("MIRROR_DSP_DETREND_WINDOW", &mut self.dsp.detrend_window)?;
        read("MIRROR_DSP_BAND_LOW_HZ", &mut self.dsp.band_low_hz)?;
        read("MIRROR_DSP_BAND_HIGH_HZ", &mut self.dsp.band_high_hz)?;
        read("MIRROR_DSP_PEAK_THRESHOLD", &mut self.dsp.peak_threshold)?;
        read("MIRROR_DSP_MIN_SIGNAL_LEN", &mut self.dsp.min_signal_len)?;

        // BPM overrides
        read("MIRROR_BPM_MIN_BPM", &mut self.bpm.min_bpm)?;
        read("MIRROR_BPM_MAX_BPM", &mut self.bpm.max_bpm)?;
        read("MIRROR_BPM_SMOOTHING_ALPHA", &mut self.bpm.smoothing_alpha)?;

        // Stress overrides
        read("MIRROR_STRESS_HIGH_RATIO", &mut self.stress.high_ratio)?;
        read("MIRROR_STRESS_CLEAR_RATIO", &mut self.stress.clear_ratio)?;
        read("MIRROR_STRESS_MIN_SUSTAIN_MS", &mut self.stress.min_sustain_ms)?;
        read("MIRROR_STRESS_BASELINE_RETENTION", &mut self.stress.baseline_retention)?;

        // Quality overrides
        read("MIRROR_QUALITY_WINDOW", &mut self.quality.window)?;
        read("MIRROR_QUALITY_FLOOR", &mut self.quality.floor)?;
        read("MIRROR_QUALITY_CEILING", &mut self.quality.ceiling)?;
        read("MIRROR_QUALITY_VARIANCE_GAIN", &mut self.quality.variance_gain)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Validation(msg.to_string())) };

        // Sampler validation
        if !(self.sampler.target_fps > 0.0) {
            return invalid("sampler.target_fps must be positive");
        }
        if self.sampler.max_samples == 0 {
            return invalid("sampler.max_samples must be > 0");
        }
        if self.sampler.min_samples > self.sampler.max_samples {
            return invalid("sampler.min_samples must be <= max_samples");
        }
        if self.sampler.min_samples < self.dsp.min_signal_len {
            return invalid("sampler.min_samples must be >= dsp.min_signal_len");
        }
        if self.sampler.publish_interval_ms < 0 {
            return invalid("sampler.publish_interval_ms must be non-negative");
        }
        if self.sampler.pixel_stride == 0 {
            return invalid("sampler.pixel_stride must be > 0");
        }

        // DSP validation
        if self.dsp.detrend_window == 0 {
            return invalid("dsp.detrend_window must be > 0");
        }
        let nyquist = self.sampler.target_fps / 2.0;
        if !(self.dsp.band_low_hz > 0.0
            && self.dsp.band_low_hz < self.dsp.band_high_hz
            && self.dsp.band_high_hz < nyquist)
        {
            return invalid("dsp band must satisfy 0 < band_low_hz < band_high_hz < target_fps / 2");
        }
        if !self.dsp.peak_threshold.is_finite() {
            return invalid("dsp.peak_threshold must be finite");
        }
        if self.dsp.min_signal_len < 3 {
            return invalid("dsp.min_signal_len must be >= 3");
        }

        // BPM validation
        if !(self.bpm.min_bpm > 0.0 && self.bpm.min_bpm < self.bpm.max_bpm && self.bpm.max_bpm.is_finite()) {
            return invalid("bpm.min_bpm must be in (0, max_bpm) with a finite max_bpm");
        }
        if !(self.bpm.smoothing_alpha > 0.0 && self.bpm.smoothing_alpha <= 1.0) {
            return invalid("bpm.smoothing_alpha must be in (0, 1]");
        }

        // Stress validation
        if !(self.stress.clear_ratio >= 1.0) {
            return invalid("stress.clear_ratio must be >= 1.0");
        }
        if !(self.stress.high_ratio > self.stress.clear_ratio && self.stress.high_ratio.is_finite()) {
            return invalid("stress.high_ratio must be finite and > clear_ratio");
        }
        if self.stress.min_sustain_ms < 0 {
            return invalid("stress.min_sustain_ms must be non-negative");
        }
        if !(self.stress.baseline_retention > 0.0 && self.stress.baseline_retention < 1.0) {
            return invalid("stress.baseline_retention must be in (0, 1)");
        }

        // Quality validation
        if self.quality.ceiling > 100 {
            return invalid("quality.ceiling must be <= 100");
        }
        if self.quality.floor > self.quality.ceiling {
            return invalid("quality.floor must be <= ceiling");
        }
        if !(self.quality.variance_gain >= 0.0 && self.quality.variance_gain.is_finite()) {
            return invalid("quality.variance_gain must be finite and non-negative");
        }
        if self.quality.window == 0 {
            return invalid("quality.window must be > 0");
        }

        Ok(())
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self
            .to_toml_string()
            .map_err(|e| ConfigError::Validation(format!("TOML serialization error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn bpm_estimator_config(&self) -> BpmEstimatorConfig {
        BpmEstimatorConfig {
            min_signal_len: self.dsp.min_signal_len,
            peak_threshold: self.dsp.peak_threshold,
            min_bpm: self.bpm.min_bpm,
            max_bpm: self.bpm.max_bpm,
        }
    }

    pub fn stress_config(&self) -> StressConfig {
        StressConfig {
            high_ratio: self.stress.high_ratio,
            clear_ratio: self.stress.clear_ratio,
            min_sustain_ms: self.stress.min_sustain_ms,
        }
    }

    pub fn quality_config(&self) -> SignalQualityConfig {
        SignalQualityConfig {
            window: self.quality.window,
            floor: self.quality.floor,
            ceiling: self.quality.ceiling,
            variance_gain: self.quality.variance_gain,
        }
    }
}
