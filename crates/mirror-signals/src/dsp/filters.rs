//! Cardiac bandpass filter
//!
//! Second-order IIR (biquad) bandpass that keeps roughly 0.7-3.0 Hz, i.e.
//! 42-180 BPM. Coefficients follow the RBJ audio-EQ cookbook "constant 0 dB
//! peak gain" bandpass, centred on the geometric mean of the band edges.
//!
//! The coefficients are only meaningful at the sampling rate they were
//! designed for. `CARDIAC_30HZ` matches the sampler's default 30 fps target;
//! use [`BandpassCoefficients::design`] when the target rate differs.

use crate::error::SignalError;
use ndarray::Array1;
use std::f64::consts::{LN_2, PI};

/// Biquad coefficients in direct form I: `a0·y = b0·x + b1·x1 + b2·x2 − a1·y1 − a2·y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandpassCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

/// 0.7-3.0 Hz passband at 30 samples/second.
pub const CARDIAC_30HZ: BandpassCoefficients = BandpassCoefficients {
    b0: 0.241_498_436_159_073,
    b1: 0.0,
    b2: -0.241_498_436_159_073,
    a0: 1.241_498_436_159_073,
    a1: -1.908_588_642_434_241,
    a2: 0.758_501_563_840_927,
};

impl BandpassCoefficients {
    /// Design a bandpass for `[low_hz, high_hz]` at `sample_rate` samples/second.
    pub fn design(sample_rate: f32, low_hz: f32, high_hz: f32) -> Result<Self, SignalError> {
        let fs = sample_rate as f64;
        let low = low_hz as f64;
        let high = high_hz as f64;

        if !(fs.is_finite() && fs > 0.0) {
            return Err(SignalError::InvalidFilterDesign(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        if !(low > 0.0 && high > low && high < fs / 2.0) {
            return Err(SignalError::InvalidFilterDesign(format!(
                "band {}-{} Hz must satisfy 0 < low < high < {} Hz",
                low_hz,
                high_hz,
                fs / 2.0
            )));
        }

        let center = (low * high).sqrt();
        let bandwidth_octaves = (high / low).log2();
        let w0 = 2.0 * PI * center / fs;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 * (LN_2 / 2.0 * bandwidth_octaves * w0 / sin_w0).sinh();

        let coeffs = Self {
            b0: alpha,
            b1: 0.0,
            b2: -alpha,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_w0,
            a2: 1.0 - alpha,
        };

        if !coeffs.is_stable() {
            return Err(SignalError::InvalidFilterDesign(format!(
                "band {}-{} Hz at {} Hz yields unstable poles",
                low_hz, high_hz, sample_rate
            )));
        }

        Ok(coeffs)
    }

    /// Both poles strictly inside the unit circle (Jury conditions for a biquad).
    pub fn is_stable(&self) -> bool {
        if self.a0 == 0.0 || !self.a0.is_finite() {
            return false;
        }
        let a1 = self.a1 / self.a0;
        let a2 = self.a2 / self.a0;
        a2.abs() < 1.0 && a1.abs() < 1.0 + a2
    }
}

impl Default for BandpassCoefficients {
    fn default() -> Self {
        CARDIAC_30HZ
    }
}

/// Stateful bandpass filter.
///
/// Holds the last two inputs and outputs. One instance per signal source;
/// call [`reset`](Self::reset) before feeding an unrelated or discontinuous window.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    coeffs: BandpassCoefficients,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BandpassFilter {
    /// Cardiac band at 30 samples/second.
    pub fn new() -> Self {
        Self::with_coefficients(CARDIAC_30HZ)
    }

    pub fn with_coefficients(coeffs: BandpassCoefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn coefficients(&self) -> &BandpassCoefficients {
        &self.coeffs
    }

    /// Filter one sample.
    pub fn filter(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let x = x as f64;
        let y = (c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2) / c.a0;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        // The f64 state cannot overflow, but its f32 image can near f32::MAX
        (y as f32).clamp(f32::MIN, f32::MAX)
    }

    /// Filter a whole signal, continuing from the current state.
    pub fn filter_signal(&mut self, signal: &Array1<f32>) -> Array1<f32> {
        signal.mapv(|x| self.filter(x))
    }

    /// Reset, then filter `signal` as a fresh window.
    pub fn process_window(&mut self, signal: &Array1<f32>) -> Array1<f32> {
        self.reset();
        self.filter_signal(signal)
    }

    /// Zero the two-sample input/output history.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for BandpassFilter {
    fn default() -> Self {
        Self::new()
    }
}
