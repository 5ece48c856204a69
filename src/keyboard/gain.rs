use crate::config::{DEFAULT_GAIN, MAX_GAIN};

/// Resolution of the gain slider.
pub const GAIN_RESOLUTION: f32 = 0.001;

/// Size of a relative gain nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainStep {
    /// 0.001
    Fine,
    /// 0.01
    Medium,
    /// 0.1
    Coarse,
}

impl GainStep {
    pub fn amount(self) -> f32 {
        match self {
            GainStep::Fine => 0.001,
            GainStep::Medium => 0.01,
            GainStep::Coarse => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Master gain plus the value to restore on unmute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterGain {
    value: f32,
    last: f32,
}

impl MasterGain {
    /// Non-finite `initial` falls back to [`DEFAULT_GAIN`].
    pub fn new(initial: f32) -> Self {
        let initial = if initial.is_finite() { initial } else { DEFAULT_GAIN };
        let value = initial.clamp(0.0, MAX_GAIN);
        Self { value, last: value }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Gain that unmute will restore.
    pub fn last(&self) -> f32 {
        self.last
    }

    pub fn is_muted(&self) -> bool {
        self.value == 0.0
    }

    /// Absolute set, as from the slider. Returns `true` if the value changed.
    /// NaN and infinities are rejected.
    pub fn set(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.replace(value.clamp(0.0, MAX_GAIN))
    }

    /// Relative nudge, snapped to the slider resolution so repeated steps
    /// land back on exact values (and on exactly zero).
    pub fn adjust(&mut self, step: GainStep, direction: Direction) -> bool {
        let delta = match direction {
            Direction::Up => step.amount(),
            Direction::Down => -step.amount(),
        };
        let snapped = ((self.value + delta) / GAIN_RESOLUTION).round() * GAIN_RESOLUTION;
        // + 0.0 turns a rounded -0.0 into 0.0
        self.replace(snapped.clamp(0.0, MAX_GAIN) + 0.0)
    }

    /// Mute if audible, otherwise restore the gain saved at mute time.
    pub fn toggle_mute(&mut self) -> bool {
        if self.value == 0.0 {
            self.replace(self.last)
        } else {
            self.last = self.value;
            self.replace(0.0)
        }
    }

    fn replace(&mut self, value: f32) -> bool {
        let changed = value != self.value;
        self.value = value;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_round_trip_is_exact() {
        for start in [0.2, 0.001, 1.337, 2.0] {
            let mut gain = MasterGain::new(start);
            assert!(gain.toggle_mute());
            assert_eq!(gain.value(), 0.0);
            assert_eq!(gain.last(), start);
            assert!(gain.toggle_mute());
            assert_eq!(gain.value(), start);
        }
    }

    #[test]
    fn unmute_restores_gain_from_before_mute() {
        let mut gain = MasterGain::new(0.2);
        gain.set(0.8);
        gain.toggle_mute();
        gain.toggle_mute();
        assert_eq!(gain.value(), 0.8);
    }

    #[test]
    fn steps_clamp_to_slider_range() {
        let mut gain = MasterGain::new(0.05);
        assert!(gain.adjust(GainStep::Coarse, Direction::Down));
        assert_eq!(gain.value(), 0.0);
        assert!(!gain.adjust(GainStep::Fine, Direction::Down));

        let mut gain = MasterGain::new(1.95);
        gain.adjust(GainStep::Coarse, Direction::Up);
        assert_eq!(gain.value(), MAX_GAIN);
    }

    #[test]
    fn steps_return_to_zero_exactly() {
        let mut gain = MasterGain::new(0.2);
        gain.adjust(GainStep::Coarse, Direction::Down);
        gain.adjust(GainStep::Coarse, Direction::Down);
        assert_eq!(gain.value(), 0.0);
        assert!(gain.is_muted());
    }

    #[test]
    fn fine_step() {
        let mut gain = MasterGain::new(0.2);
        gain.adjust(GainStep::Fine, Direction::Up);
        assert!((gain.value() - 0.201).abs() < 1e-6);
        gain.adjust(GainStep::Medium, Direction::Down);
        assert!((gain.value() - 0.191).abs() < 1e-6);
    }

    #[test]
    fn set_reports_changes_only() {
        let mut gain = MasterGain::new(0.2);
        assert!(!gain.set(0.2));
        assert!(gain.set(0.5));
        assert!(!gain.set(0.5));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut gain = MasterGain::new(0.4);
        assert!(!gain.set(f32::NAN));
        assert!(!gain.set(f32::INFINITY));
        assert_eq!(gain.value(), 0.4);

        gain.toggle_mute();
        gain.toggle_mute();
        assert_eq!(gain.value(), 0.4);

        assert_eq!(MasterGain::new(f32::NAN).value(), DEFAULT_GAIN);
    }
}
