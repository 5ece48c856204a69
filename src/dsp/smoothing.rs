/*
Exponential Target Smoothing
============================

Turning a tone on or off by jumping its gain from 0 to 0.2 produces an
audible click: the waveform gets a discontinuity, which is broadband
energy. Instead every gain change approaches its target exponentially.

    value(t) = target + (start - target) * e^(-(t - t0) / tau)

  tau       Time constant in seconds. After one tau the value has covered
            ~63% of the distance, after 5 tau ~99.3%, which is treated as
            "done" by the voice manager when it schedules the stop.

  t0        Engine time at which the approach begins. Until then the
            parameter holds its current value.


Per-Sample Form
---------------

Evaluating exp() per sample is unnecessary. The closed form above is the
solution of a one-pole low-pass filter, so each sample we do:

    value += (target - value) * alpha
    alpha  = 1 - e^(-1 / (tau * sample_rate))

alpha is computed once when the target is set.

    1.0 ┤        ______________
        │     .-'
        │   ,'
        │  /
        │ /
    0.0 ┼/─────────────────────→ time
        t0   tau          5 tau

A new target replaces the pending one and starts from whatever value the
parameter currently has, so retargets mid-ramp are continuous.
*/

/// A pending "approach `target` from `start_frame` on" request.
#[derive(Debug, Clone, Copy)]
struct Approach {
    target: f32,
    start_frame: u64,
    alpha: f32,
}

#[derive(Debug, Clone)]
pub struct TargetParam {
    value: f32,
    approach: Option<Approach>,
}

impl TargetParam {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            approach: None,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Target the approach will settle on, if one is scheduled.
    pub fn target(&self) -> Option<f32> {
        self.approach.map(|a| a.target)
    }

    /// Schedule an exponential approach toward `target`.
    ///
    /// A non-positive time constant jumps straight to the target once
    /// `start_frame` is reached.
    pub fn set_target_at(
        &mut self,
        target: f32,
        start_frame: u64,
        time_constant: f64,
        sample_rate: f32,
    ) {
        let alpha = if time_constant <= 0.0 {
            1.0
        } else {
            1.0 - (-1.0 / (time_constant * sample_rate as f64)).exp() as f32
        };
        self.approach = Some(Approach {
            target,
            start_frame,
            alpha,
        });
    }

    /// Advance one sample at absolute engine frame `frame`, returning the new value.
    #[inline]
    pub fn next_value(&mut self, frame: u64) -> f32 {
        if let Some(approach) = self.approach {
            if frame >= approach.start_frame {
                self.value += (approach.target - self.value) * approach.alpha;
            }
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    fn run(param: &mut TargetParam, from: u64, frames: u64) -> f32 {
        let mut v = param.value();
        for f in from..from + frames {
            v = param.next_value(f);
        }
        v
    }

    #[test]
    fn holds_without_target() {
        let mut p = TargetParam::new(0.3);
        assert_eq!(run(&mut p, 0, 1000), 0.3);
    }

    #[test]
    fn one_time_constant_covers_63_percent() {
        let mut p = TargetParam::new(0.0);
        p.set_target_at(1.0, 0, 0.2, SR);
        let v = run(&mut p, 0, (0.2 * SR) as u64);
        assert!((v - 0.632).abs() < 0.01, "got {v}");
    }

    #[test]
    fn five_time_constants_are_nearly_settled() {
        let mut p = TargetParam::new(0.5);
        p.set_target_at(0.0, 0, 0.2, SR);
        let v = run(&mut p, 0, SR as u64);
        assert!(v < 0.5 * 0.01, "got {v}");
    }

    #[test]
    fn waits_for_start_frame() {
        let mut p = TargetParam::new(0.0);
        p.set_target_at(1.0, 100, 0.01, SR);
        assert_eq!(run(&mut p, 0, 100), 0.0);
        assert!(p.next_value(100) > 0.0);
    }

    #[test]
    fn retarget_is_continuous() {
        let mut p = TargetParam::new(0.0);
        p.set_target_at(1.0, 0, 0.05, SR);
        let before = run(&mut p, 0, 500);
        p.set_target_at(0.0, 500, 0.05, SR);
        let after = p.next_value(500);
        assert!((before - after).abs() < 0.01);
        assert_eq!(p.target(), Some(0.0));
    }

    #[test]
    fn zero_time_constant_jumps() {
        let mut p = TargetParam::new(0.0);
        p.set_target_at(0.7, 0, 0.0, SR);
        assert_eq!(p.next_value(0), 0.7);
    }
}
