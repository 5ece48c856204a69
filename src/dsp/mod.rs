//! Low-level DSP primitives used by the engine renderer.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside renderer nodes.

/// Oscillator waveforms for tone nodes.
pub mod oscillator;
/// Exponential "approach target with time constant" parameter.
pub mod smoothing;

pub use oscillator::{Oscillator, Waveform};
pub use smoothing::TargetParam;
