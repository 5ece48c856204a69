//! The keyboard controller: the state a user manipulates and the glue that
//! keeps the voice graph in sync with it.
//!
//! Every mutating call reconciles immediately. The engine is created on the
//! first key toggle, inside the call, so a backend that insists on a user
//! gesture before producing sound is satisfied.
//!
//! ```
//! use tonegrid::{
//!     config::KeyboardConfig,
//!     engine::offline::OfflineEngine,
//!     error::EngineResult,
//!     keyboard::Keyboard,
//!     tuning::KeyIndex,
//! };
//!
//! let factory = || EngineResult::Ok(OfflineEngine::new(48_000.0));
//! let mut keyboard = Keyboard::new(KeyboardConfig::default(), factory);
//! let a4 = KeyIndex::REFERENCE;
//! assert!(keyboard.toggle(a4));
//! assert_eq!(keyboard.live_voices(), 1);
//! keyboard.pause_all();
//! assert!(!keyboard.is_playing(a4));
//! ```

pub mod gain;

use crate::{
    config::KeyboardConfig,
    engine::{AudioEngine, EngineFactory, EngineSlot, EngineStatus},
    tuning::{KeyIndex, KeyNames, NameStyle, Tuning, KEY_COUNT},
    voice::VoiceManager,
};

pub use gain::{Direction, GainStep, MasterGain};

pub struct Keyboard<F: EngineFactory> {
    tuning: Tuning,
    names: KeyNames,
    playing: Vec<bool>,
    gain: MasterGain,
    engine: EngineSlot<F>,
    voices: VoiceManager,
}

impl<F: EngineFactory> Keyboard<F> {
    pub fn new(config: KeyboardConfig, factory: F) -> Self {
        Self {
            tuning: Tuning::new(config.reference_pitch),
            names: KeyNames::new(),
            playing: vec![false; KEY_COUNT],
            gain: MasterGain::new(config.initial_gain),
            engine: EngineSlot::new(factory),
            voices: VoiceManager::new(&config),
        }
    }

    /// Flip one key. Creates the engine on first use. Returns the key's new state.
    pub fn toggle(&mut self, key: KeyIndex) -> bool {
        self.engine.ensure();
        let state = &mut self.playing[key.index()];
        *state = !*state;
        let now_playing = *state;
        self.reconcile();
        now_playing
    }

    /// Silence every key.
    pub fn pause_all(&mut self) {
        self.playing.fill(false);
        self.reconcile();
    }

    /// Mute, or restore the gain from before the last mute.
    pub fn toggle_mute(&mut self) {
        if self.gain.toggle_mute() {
            self.broadcast_gain();
        }
    }

    /// Absolute gain, clamped to the slider range.
    pub fn set_gain(&mut self, value: f32) {
        if self.gain.set(value) {
            self.broadcast_gain();
        }
    }

    pub fn adjust_gain(&mut self, step: GainStep, direction: Direction) {
        if self.gain.adjust(step, direction) {
            self.broadcast_gain();
        }
    }

    /// Retune. Voices already sounding keep their pitch; keys pressed
    /// afterwards use the new table.
    pub fn set_reference_pitch(&mut self, hz: f64) {
        self.tuning.set_reference_pitch(hz);
    }

    /// Fire due deferred stops. Call regularly (every UI frame).
    pub fn tick(&mut self) -> usize {
        match self.engine.get_mut() {
            Some(engine) => {
                engine.flush();
                self.voices.tick(engine)
            }
            None => 0,
        }
    }

    /// Fade out everything. Keep calling [`Keyboard::tick`] until
    /// [`Keyboard::is_idle`] to let the fades finish.
    pub fn shutdown(&mut self) {
        match self.engine.get_mut() {
            Some(engine) => self.voices.shutdown(engine),
            None => self.voices.freeze(),
        }
    }

    /// No voice is sounding or waiting to be stopped.
    pub fn is_idle(&self) -> bool {
        self.voices.live_count() == 0 && self.voices.pending_stops() == 0
    }

    pub fn is_playing(&self, key: KeyIndex) -> bool {
        self.playing[key.index()]
    }

    pub fn playing(&self) -> &[bool] {
        &self.playing
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }

    pub fn last_gain(&self) -> f32 {
        self.gain.last()
    }

    pub fn is_muted(&self) -> bool {
        self.gain.is_muted()
    }

    pub fn reference_pitch(&self) -> f64 {
        self.tuning.reference_pitch()
    }

    pub fn frequency(&self, key: KeyIndex) -> f64 {
        self.tuning.frequency(key)
    }

    pub fn name(&self, key: KeyIndex, style: NameStyle) -> &str {
        self.names.name(key, style)
    }

    pub fn live_voices(&self) -> usize {
        self.voices.live_count()
    }

    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.get()
    }

    pub fn engine_mut(&mut self) -> Option<&mut F::Engine> {
        self.engine.get_mut()
    }

    /// Engine clock, if an engine exists.
    pub fn current_time(&self) -> Option<f64> {
        self.engine.get().map(AudioEngine::current_time)
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.engine.status()
    }

    /// Engine commands lost to a full queue. Nonzero means some nodes may
    /// never have been stopped.
    pub fn dropped_commands(&self) -> u64 {
        self.engine.get().map_or(0, |e| e.dropped_commands())
    }

    /// Hand the engine back, e.g. to close the output stream.
    pub fn into_engine(mut self) -> Option<F::Engine> {
        self.engine.take()
    }

    fn reconcile(&mut self) {
        if let Some(engine) = self.engine.get_mut() {
            self.voices
                .reconcile(engine, &self.playing, self.tuning.table(), self.gain.value());
        }
    }

    fn broadcast_gain(&mut self) {
        log::debug!("master gain {:.3}", self.gain.value());
        if let Some(engine) = self.engine.get_mut() {
            self.voices.set_gain(engine, self.gain.value());
        }
    }
}
