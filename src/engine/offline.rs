//! Engine that renders on the caller's thread.
//!
//! Commands are applied to the renderer immediately and recorded in a
//! journal, which makes the engine useful for deterministic tests, benches
//! and bouncing audio without a sound card. The clock only moves when the
//! caller renders.

use super::{
    renderer::Renderer, AudioEngine, EngineCommand, EngineState, NodeId,
};
use crate::{
    error::{EngineError, EngineResult},
    MAX_BLOCK_SIZE,
};

pub struct OfflineEngine {
    renderer: Renderer,
    journal: Vec<EngineCommand>,
    next_id: u64,
    state: EngineState,
    resume_attempts: u32,
    refuse_resume: bool,
}

impl OfflineEngine {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            renderer: Renderer::new(sample_rate),
            journal: Vec::new(),
            next_id: 0,
            state: EngineState::Running,
            resume_attempts: 0,
            refuse_resume: false,
        }
    }

    /// Start suspended, like a context created outside a user gesture.
    pub fn suspended(sample_rate: f32) -> Self {
        Self {
            state: EngineState::Suspended,
            ..Self::new(sample_rate)
        }
    }

    /// Make every later `resume` fail.
    pub fn refuse_resume(&mut self) {
        self.refuse_resume = true;
    }

    pub fn resume_attempts(&self) -> u32 {
        self.resume_attempts
    }

    /// Every command submitted so far, oldest first.
    pub fn journal(&self) -> &[EngineCommand] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Render `frames` samples of mono output. Suspended engines produce
    /// silence and keep their clock still.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        if self.state == EngineState::Running {
            for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
                self.renderer.render(chunk);
            }
        }
        out
    }

    /// Move the clock forward by `seconds`, discarding the audio.
    pub fn advance(&mut self, seconds: f64) {
        let frames = (seconds * self.renderer.sample_rate() as f64).round() as usize;
        let mut scratch = [0.0f32; MAX_BLOCK_SIZE];
        let mut remaining = frames;
        while remaining > 0 && self.state == EngineState::Running {
            let n = remaining.min(MAX_BLOCK_SIZE);
            self.renderer.render(&mut scratch[..n]);
            remaining -= n;
        }
    }
}

impl AudioEngine for OfflineEngine {
    fn current_time(&self) -> f64 {
        self.renderer.current_time()
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn resume(&mut self) -> EngineResult<()> {
        self.resume_attempts += 1;
        if self.refuse_resume {
            return Err(EngineError::Play("resume refused".into()));
        }
        self.state = EngineState::Running;
        Ok(())
    }

    fn submit(&mut self, cmd: EngineCommand) {
        self.journal.push(cmd);
        self.renderer.apply(cmd);
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}
