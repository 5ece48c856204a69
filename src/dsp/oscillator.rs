#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/*
Tone Oscillator
===============

Every key of the keyboard is backed by one oscillator running at a fixed
frequency. The oscillator is a phase accumulator: a number in [0, 1) that
advances by `frequency / sample_rate` every sample and wraps around. The
waveform is a pure function of that phase.

    phase   0.0        0.25        0.5        0.75       1.0
    sine    0 ───────→ 1 ────────→ 0 ───────→ -1 ──────→ 0

Sine is the default: a single partial with no overtones, which is what a
reference-tone keyboard wants. The other shapes are kept for timbre
experiments and cost the same per sample.

Phase is kept in f64 so that long-held tones (minutes) do not drift audibly
from accumulated rounding in the increment.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Evaluate the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    phase: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let out = self.waveform.sample(self.phase as f32);
        self.phase += self.frequency as f64 / sample_rate as f64;
        self.phase -= self.phase.floor();
        out
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }
}
