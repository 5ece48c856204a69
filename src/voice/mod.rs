//! Voice lifecycle: one tone + gain pair per sounding key.
//!
//! The manager owns the key → voice map. It never decides *which* keys play;
//! the controller hands it the desired playback state and it reconciles the
//! engine graph to match:
//!
//! ```text
//!   press    create tone(f) → gain(0) → output, start, ramp gain → master
//!   release  ramp gain → 0, forget the voice, stop tone 5τ later
//!   volume   ramp every live gain → new master
//!   shutdown release everything, ignore later reconciles
//! ```
//!
//! Deferred stops live in an engine-clock [`Scheduler`] and cannot be
//! cancelled. Re-pressing a key during its fade creates a brand new voice;
//! the old one still stops on schedule. Node ids are never reused, so the
//! old stop can only touch the old nodes.

pub mod reconcile;

use crate::{
    config::KeyboardConfig,
    dsp::Waveform,
    engine::{scheduler::Scheduler, AudioEngine, Destination, NodeId},
    tuning::{FrequencyTable, KeyIndex, KEY_COUNT},
};

pub use reconcile::{plan, VoiceAction};

/// Engine nodes backing one sounding key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub tone: NodeId,
    pub gain: NodeId,
    pub frequency: f64,
}

#[derive(Debug)]
struct PendingStop {
    key: KeyIndex,
    tone: NodeId,
    gain: NodeId,
}

pub struct VoiceManager {
    voices: Vec<Option<Voice>>,
    pending: Scheduler<PendingStop>,
    waveform: Waveform,
    time_constant: f64,
    release_delay: f64,
    shut_down: bool,
}

impl VoiceManager {
    pub fn new(config: &KeyboardConfig) -> Self {
        Self {
            voices: vec![None; KEY_COUNT],
            pending: Scheduler::new(),
            waveform: config.waveform,
            time_constant: config.time_constant,
            release_delay: config.release_delay(),
            shut_down: false,
        }
    }

    pub fn voice(&self, key: KeyIndex) -> Option<&Voice> {
        self.voices[key.index()].as_ref()
    }

    pub fn live_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    /// Which keys currently have a voice.
    pub fn live_mask(&self) -> Vec<bool> {
        self.voices.iter().map(Option::is_some).collect()
    }

    /// Released voices whose tone has not been stopped yet.
    pub fn pending_stops(&self) -> usize {
        self.pending.len()
    }

    /// Engine time of the next deferred stop.
    pub fn next_stop(&self) -> Option<f64> {
        self.pending.next_due()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Bring the set of live voices in line with `playing`.
    pub fn reconcile<E: AudioEngine>(
        &mut self,
        engine: &mut E,
        playing: &[bool],
        table: &FrequencyTable,
        gain: f32,
    ) {
        if self.shut_down {
            return;
        }

        for (key, action) in plan(playing, &self.live_mask()) {
            match action {
                VoiceAction::Create => {
                    let voice = self.create(engine, table.get(key), gain);
                    log::debug!("voice on: key {} at {:.2} Hz", key.index(), voice.frequency);
                    self.voices[key.index()] = Some(voice);
                }
                VoiceAction::Release => {
                    if let Some(voice) = self.voices[key.index()].take() {
                        self.release(engine, key, voice);
                    }
                }
            }
        }
    }

    /// Retarget every live voice toward a new master gain.
    pub fn set_gain<E: AudioEngine>(&mut self, engine: &mut E, gain: f32) {
        let now = engine.current_time();
        for voice in self.voices.iter().flatten() {
            engine.set_target_at_time(voice.gain, gain, now, self.time_constant);
        }
    }

    /// Stop every released tone whose fade has run out. Returns how many.
    pub fn tick<E: AudioEngine>(&mut self, engine: &mut E) -> usize {
        let due = self.pending.tick(engine.current_time());
        for stop in &due {
            engine.stop(stop.tone);
            engine.disconnect(stop.gain);
            log::debug!("voice stopped: key {}", stop.key.index());
        }
        due.len()
    }

    /// Fade out and schedule stops for every live voice, then refuse further
    /// reconciliation.
    pub fn shutdown<E: AudioEngine>(&mut self, engine: &mut E) {
        for key in KeyIndex::all() {
            if let Some(voice) = self.voices[key.index()].take() {
                self.release(engine, key, voice);
            }
        }
        self.freeze();
    }

    /// Refuse further reconciliation without touching the engine.
    pub fn freeze(&mut self) {
        self.shut_down = true;
    }

    fn create<E: AudioEngine>(&self, engine: &mut E, frequency: f64, gain: f32) -> Voice {
        let tone = engine.create_tone(self.waveform, frequency as f32);
        let gain_node = engine.create_gain(0.0);
        engine.connect(tone, Destination::Node(gain_node));
        engine.connect(gain_node, Destination::Output);
        engine.start(tone);
        let now = engine.current_time();
        engine.set_target_at_time(gain_node, gain, now, self.time_constant);

        Voice {
            tone,
            gain: gain_node,
            frequency,
        }
    }

    fn release<E: AudioEngine>(&mut self, engine: &mut E, key: KeyIndex, voice: Voice) {
        let now = engine.current_time();
        engine.set_target_at_time(voice.gain, 0.0, now, self.time_constant);
        self.pending.enqueue(
            now + self.release_delay,
            PendingStop {
                key,
                tone: voice.tone,
                gain: voice.gain,
            },
        );
        log::debug!("voice released: key {}", key.index());
    }
}
