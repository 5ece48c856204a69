//! The audio engine boundary.
//!
//! Everything the keyboard needs from an audio backend is expressed as a
//! handful of fire-and-forget commands: create a tone, create a gain, connect
//! them, start, schedule a smoothed gain change, stop, disconnect. Commands
//! never block and never report success; the renderer applies them on its
//! own thread at the next block boundary.
//!
//! Two engines implement the boundary:
//! - [`offline::OfflineEngine`] renders on demand on the calling thread and
//!   keeps a journal of every command, for tests and benches.
//! - [`host::CpalEngine`] ships commands over a lock-free queue to a cpal
//!   output stream.

#[cfg(feature = "cpal")]
pub mod host;
pub mod message;
pub mod offline;
pub mod renderer;
pub mod scheduler;
pub mod slot;

use crate::{dsp::Waveform, error::EngineResult};

pub use message::{Destination, EngineCommand, NodeId};
pub use slot::{EngineSlot, EngineStatus};

/// Whether the engine clock is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Suspended,
}

/// Control-plane handle to an audio engine.
///
/// Implementors provide the clock, id allocation and command submission; the
/// node operations are built on top of those.
pub trait AudioEngine {
    /// Engine clock in seconds. Monotonic; stands still while suspended.
    fn current_time(&self) -> f64;

    fn state(&self) -> EngineState;

    /// Best-effort attempt to get a suspended engine running.
    fn resume(&mut self) -> EngineResult<()>;

    /// Hand a command to the renderer without waiting for it.
    fn submit(&mut self, cmd: EngineCommand);

    /// Fresh node id, never returned before by this engine.
    fn allocate_id(&mut self) -> NodeId;

    /// Push out commands a full queue held back. Engines without a queue
    /// have nothing to do.
    fn flush(&mut self) {}

    /// Commands lost for good since the engine was created.
    fn dropped_commands(&self) -> u64 {
        0
    }

    fn create_tone(&mut self, waveform: Waveform, frequency: f32) -> NodeId {
        let id = self.allocate_id();
        self.submit(EngineCommand::CreateTone {
            id,
            waveform,
            frequency,
        });
        id
    }

    fn create_gain(&mut self, value: f32) -> NodeId {
        let id = self.allocate_id();
        self.submit(EngineCommand::CreateGain { id, value });
        id
    }

    fn connect(&mut self, source: NodeId, destination: Destination) {
        self.submit(EngineCommand::Connect {
            source,
            destination,
        });
    }

    fn start(&mut self, tone: NodeId) {
        self.submit(EngineCommand::Start { tone });
    }

    fn set_target_at_time(&mut self, gain: NodeId, target: f32, start_time: f64, time_constant: f64) {
        self.submit(EngineCommand::SetTarget {
            gain,
            target,
            start_time,
            time_constant,
        });
    }

    fn stop(&mut self, tone: NodeId) {
        self.submit(EngineCommand::Stop { tone });
    }

    fn disconnect(&mut self, node: NodeId) {
        self.submit(EngineCommand::Disconnect { node });
    }
}

/// Creates the engine on first use.
///
/// Implemented for any `FnMut() -> EngineResult<E>` so callers can pass a
/// closure.
pub trait EngineFactory {
    type Engine: AudioEngine;

    fn create_engine(&mut self) -> EngineResult<Self::Engine>;
}

impl<F, E> EngineFactory for F
where
    F: FnMut() -> EngineResult<E>,
    E: AudioEngine,
{
    type Engine = E;

    fn create_engine(&mut self) -> EngineResult<Self::Engine> {
        self()
    }
}
