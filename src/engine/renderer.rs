//! Audio-thread side of the engine.
//!
//! The renderer owns every tone and gain node, applies control commands and
//! mixes the connected graph into a mono block. It never allocates after
//! construction: node storage is reserved up front and a full node table
//! drops further create requests instead of growing.

use crate::{
    dsp::{Oscillator, TargetParam},
    engine::message::{Destination, EngineCommand, MessageReceiver, NodeId},
};

/// Maximum nodes of each kind the renderer can hold at once.
pub const MAX_NODES: usize = 512;

struct ToneNode {
    id: NodeId,
    osc: Oscillator,
    gain: Option<NodeId>,
    /// Index into `gains`, resolved once per block.
    gain_slot: Option<usize>,
    started: bool,
}

struct GainNode {
    id: NodeId,
    param: TargetParam,
    to_output: bool,
    current: f32,
}

pub struct Renderer {
    sample_rate: f32,
    frame: u64,
    tones: Vec<ToneNode>,
    gains: Vec<GainNode>,
    dropped: u64,
}

impl Renderer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frame: 0,
            tones: Vec::with_capacity(MAX_NODES),
            gains: Vec::with_capacity(MAX_NODES),
            dropped: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered since creation; the engine clock.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn tone_count(&self) -> usize {
        self.tones.len()
    }

    pub fn gain_count(&self) -> usize {
        self.gains.len()
    }

    /// Create requests rejected because the node table was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn gain_value(&self, id: NodeId) -> Option<f32> {
        self.gains
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.param.value())
    }

    pub fn has_tone(&self, id: NodeId) -> bool {
        self.tones.iter().any(|t| t.id == id)
    }

    /// Apply every queued command.
    pub fn drain<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(cmd) = rx.pop() {
            self.apply(cmd);
        }
    }

    pub fn apply(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::CreateTone {
                id,
                waveform,
                frequency,
            } => {
                if self.tones.len() == MAX_NODES {
                    self.dropped += 1;
                    return;
                }
                self.tones.push(ToneNode {
                    id,
                    osc: Oscillator::new(waveform, frequency),
                    gain: None,
                    gain_slot: None,
                    started: false,
                });
            }
            EngineCommand::CreateGain { id, value } => {
                if self.gains.len() == MAX_NODES {
                    self.dropped += 1;
                    return;
                }
                self.gains.push(GainNode {
                    id,
                    param: TargetParam::new(value),
                    to_output: false,
                    current: value,
                });
            }
            EngineCommand::Connect {
                source,
                destination,
            } => match destination {
                Destination::Node(target) => {
                    if let Some(tone) = self.tones.iter_mut().find(|t| t.id == source) {
                        tone.gain = Some(target);
                    }
                }
                Destination::Output => {
                    if let Some(gain) = self.gains.iter_mut().find(|g| g.id == source) {
                        gain.to_output = true;
                    }
                }
            },
            EngineCommand::Start { tone } => {
                if let Some(tone) = self.tones.iter_mut().find(|t| t.id == tone) {
                    tone.started = true;
                }
            }
            EngineCommand::SetTarget {
                gain,
                target,
                start_time,
                time_constant,
            } => {
                let start_frame = (start_time.max(0.0) * self.sample_rate as f64).round() as u64;
                let sample_rate = self.sample_rate;
                if let Some(gain) = self.gains.iter_mut().find(|g| g.id == gain) {
                    gain.param
                        .set_target_at(target, start_frame, time_constant, sample_rate);
                }
            }
            EngineCommand::Stop { tone } => {
                if let Some(pos) = self.tones.iter().position(|t| t.id == tone) {
                    self.tones.swap_remove(pos);
                }
            }
            EngineCommand::Disconnect { node } => {
                if let Some(pos) = self.gains.iter().position(|g| g.id == node) {
                    self.gains.swap_remove(pos);
                }
                if let Some(pos) = self.tones.iter().position(|t| t.id == node) {
                    self.tones.swap_remove(pos);
                }
                for tone in self.tones.iter_mut().filter(|t| t.gain == Some(node)) {
                    tone.gain = None;
                }
            }
        }
    }

    /// Mix all started, connected tones into `out` (overwrites).
    pub fn render(&mut self, out: &mut [f32]) {
        // Gain slots shift on swap_remove, so resolve them per block
        for tone in &mut self.tones {
            tone.gain_slot = tone.gain.and_then(|id| {
                self.gains
                    .iter()
                    .position(|g| g.id == id && g.to_output)
            });
        }

        for sample in out.iter_mut() {
            for gain in &mut self.gains {
                gain.current = gain.param.next_value(self.frame);
            }

            let mut mix = 0.0;
            for tone in &mut self.tones {
                if !tone.started {
                    continue;
                }
                if let Some(slot) = tone.gain_slot {
                    mix += tone.osc.next_sample(self.sample_rate) * self.gains[slot].current;
                }
            }

            *sample = mix;
            self.frame += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Waveform;

    const SR: f32 = 48_000.0;

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn voice(r: &mut Renderer, tone: u64, gain: u64, level: f32) {
        r.apply(EngineCommand::CreateTone {
            id: NodeId(tone),
            waveform: Waveform::Sine,
            frequency: 440.0,
        });
        r.apply(EngineCommand::CreateGain {
            id: NodeId(gain),
            value: level,
        });
        r.apply(EngineCommand::Connect {
            source: NodeId(tone),
            destination: Destination::Node(NodeId(gain)),
        });
        r.apply(EngineCommand::Connect {
            source: NodeId(gain),
            destination: Destination::Output,
        });
        r.apply(EngineCommand::Start { tone: NodeId(tone) });
    }

    #[test]
    fn renders_silence_with_empty_graph() {
        let mut r = Renderer::new(SR);
        let mut buf = vec![1.0; 256];
        r.render(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
        assert_eq!(r.frame(), 256);
    }

    #[test]
    fn connected_tone_is_audible() {
        let mut r = Renderer::new(SR);
        voice(&mut r, 1, 2, 0.5);
        let mut buf = vec![0.0; 512];
        r.render(&mut buf);
        let p = peak(&buf);
        assert!(p > 0.45 && p <= 0.5 + 1e-6, "peak {p}");
    }

    #[test]
    fn unstarted_or_unrouted_tone_is_silent() {
        let mut r = Renderer::new(SR);
        r.apply(EngineCommand::CreateTone {
            id: NodeId(1),
            waveform: Waveform::Sine,
            frequency: 440.0,
        });
        r.apply(EngineCommand::CreateGain {
            id: NodeId(2),
            value: 1.0,
        });
        r.apply(EngineCommand::Connect {
            source: NodeId(1),
            destination: Destination::Node(NodeId(2)),
        });
        r.apply(EngineCommand::Start { tone: NodeId(1) });
        let mut buf = vec![0.0; 256];
        r.render(&mut buf);
        assert_eq!(peak(&buf), 0.0);
    }

    #[test]
    fn ramp_to_zero_fades_out() {
        let mut r = Renderer::new(SR);
        voice(&mut r, 1, 2, 0.5);
        r.apply(EngineCommand::SetTarget {
            gain: NodeId(2),
            target: 0.0,
            start_time: 0.0,
            time_constant: 0.2,
        });
        let mut buf = vec![0.0; SR as usize];
        r.render(&mut buf);
        let tail = peak(&buf[buf.len() - 512..]);
        assert!(tail < 0.01, "tail {tail}");
        assert!(r.gain_value(NodeId(2)).unwrap() < 0.005);
    }

    #[test]
    fn stop_and_disconnect_free_nodes() {
        let mut r = Renderer::new(SR);
        voice(&mut r, 1, 2, 0.5);
        r.apply(EngineCommand::Stop { tone: NodeId(1) });
        r.apply(EngineCommand::Disconnect { node: NodeId(2) });
        assert_eq!(r.tone_count(), 0);
        assert_eq!(r.gain_count(), 0);
        let mut buf = vec![0.0; 128];
        r.render(&mut buf);
        assert_eq!(peak(&buf), 0.0);
    }

    #[test]
    fn voices_survive_removal_of_neighbours() {
        let mut r = Renderer::new(SR);
        voice(&mut r, 1, 2, 0.25);
        voice(&mut r, 3, 4, 0.25);
        r.apply(EngineCommand::Stop { tone: NodeId(1) });
        r.apply(EngineCommand::Disconnect { node: NodeId(2) });
        let mut buf = vec![0.0; 512];
        r.render(&mut buf);
        assert!(peak(&buf) > 0.2);
        assert!(r.has_tone(NodeId(3)));
    }

    #[test]
    fn full_table_drops_creates() {
        let mut r = Renderer::new(SR);
        for i in 0..MAX_NODES as u64 + 3 {
            r.apply(EngineCommand::CreateGain {
                id: NodeId(i),
                value: 0.0,
            });
        }
        assert_eq!(r.gain_count(), MAX_NODES);
        assert_eq!(r.dropped(), 3);
    }
}
