use super::{AudioEngine, EngineFactory, EngineState};

/// What the slot currently holds, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    NotCreated,
    Running,
    Suspended,
    Unavailable,
}

/// Lazily created, single-writer home of the audio engine.
///
/// The first call to [`EngineSlot::ensure`] asks the factory for an engine;
/// every later call returns the same engine. A failed creation is remembered
/// and not retried, so the keyboard keeps working silently.
pub struct EngineSlot<F: EngineFactory> {
    factory: F,
    engine: Option<F::Engine>,
    failed: bool,
}

impl<F: EngineFactory> EngineSlot<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            engine: None,
            failed: false,
        }
    }

    /// Create the engine if this is the first request, then return it.
    pub fn ensure(&mut self) -> Option<&mut F::Engine> {
        if self.engine.is_none() && !self.failed {
            match self.factory.create_engine() {
                Ok(mut engine) => {
                    wake(&mut engine);
                    log::info!("audio engine created ({:?})", engine.state());
                    self.engine = Some(engine);
                }
                Err(err) => {
                    log::error!("audio engine unavailable, keys will be silent: {err}");
                    self.failed = true;
                }
            }
        }
        self.engine.as_mut()
    }

    pub fn get(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut F::Engine> {
        self.engine.as_mut()
    }

    pub fn status(&self) -> EngineStatus {
        match (&self.engine, self.failed) {
            (Some(engine), _) => match engine.state() {
                EngineState::Running => EngineStatus::Running,
                EngineState::Suspended => EngineStatus::Suspended,
            },
            (None, true) => EngineStatus::Unavailable,
            (None, false) => EngineStatus::NotCreated,
        }
    }

    /// Give up the engine, e.g. to close the output stream on exit.
    pub fn take(&mut self) -> Option<F::Engine> {
        self.engine.take()
    }
}

// A fresh engine may come up suspended; one resume attempt, then keep it anyway.
fn wake<E: AudioEngine>(engine: &mut E) {
    if engine.state() != EngineState::Suspended {
        return;
    }
    log::warn!("new audio engine was suspended, resuming");
    if let Err(err) = engine.resume() {
        log::error!("resume failed: {err}");
    }
    if engine.state() == EngineState::Suspended {
        log::error!("audio engine is still suspended, no audio will play");
    }
}
