//! Keyboard configuration.
//!
//! # Example
//!
//! ```
//! use tonegrid::{config::KeyboardConfig, dsp::Waveform};
//!
//! let config = KeyboardConfig::new()
//!     .reference_pitch(432.0)
//!     .initial_gain(0.5)
//!     .waveform(Waveform::Triangle);
//! assert_eq!(config.release_delay(), 1.0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::Waveform, tuning::DEFAULT_REFERENCE_PITCH};

/// Smoothing time constant for every gain change, in seconds.
pub const DEFAULT_TIME_CONSTANT: f64 = 0.2;
/// A released voice is stopped this many time constants after its fade starts.
pub const DEFAULT_RELEASE_TIME_CONSTANTS: f64 = 5.0;
/// Master gain on startup.
pub const DEFAULT_GAIN: f32 = 0.2;
/// Upper bound of the gain slider.
pub const MAX_GAIN: f32 = 2.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardConfig {
    /// Frequency of A4 in Hz.
    pub reference_pitch: f64,
    pub initial_gain: f32,
    pub time_constant: f64,
    pub release_time_constants: f64,
    pub waveform: Waveform,
}

impl KeyboardConfig {
    pub fn new() -> Self {
        Self {
            reference_pitch: DEFAULT_REFERENCE_PITCH,
            initial_gain: DEFAULT_GAIN,
            time_constant: DEFAULT_TIME_CONSTANT,
            release_time_constants: DEFAULT_RELEASE_TIME_CONSTANTS,
            waveform: Waveform::Sine,
        }
    }

    pub fn reference_pitch(mut self, hz: f64) -> Self {
        self.reference_pitch = hz;
        self
    }

    /// Starting gain, clamped to the slider range. Non-finite values are ignored.
    pub fn initial_gain(mut self, gain: f32) -> Self {
        if gain.is_finite() {
            self.initial_gain = gain.clamp(0.0, MAX_GAIN);
        }
        self
    }

    pub fn time_constant(mut self, seconds: f64) -> Self {
        self.time_constant = seconds.max(0.0);
        self
    }

    pub fn release_time_constants(mut self, count: f64) -> Self {
        self.release_time_constants = count.max(0.0);
        self
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    /// Seconds between the start of a release fade and the tone stop.
    pub fn release_delay(&self) -> f64 {
        self.time_constant * self.release_time_constants
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = KeyboardConfig::default();
        assert_eq!(config.reference_pitch, 440.0);
        assert_eq!(config.initial_gain, 0.2);
        assert_eq!(config.time_constant, 0.2);
        assert_eq!(config.release_delay(), 1.0);
        assert_eq!(config.waveform, Waveform::Sine);
    }

    #[test]
    fn gain_is_clamped_to_slider_range() {
        assert_eq!(KeyboardConfig::new().initial_gain(3.0).initial_gain, MAX_GAIN);
        assert_eq!(KeyboardConfig::new().initial_gain(-1.0).initial_gain, 0.0);
    }

    #[test]
    fn non_finite_gain_keeps_previous() {
        let config = KeyboardConfig::new().initial_gain(0.7).initial_gain(f32::NAN);
        assert_eq!(config.initial_gain, 0.7);
        let config = KeyboardConfig::new().initial_gain(f32::NEG_INFINITY);
        assert_eq!(config.initial_gain, DEFAULT_GAIN);
    }
}
