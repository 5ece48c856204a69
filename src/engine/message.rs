#[cfg(feature = "rtrb")]
use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::dsp::Waveform;

/// Identifier of a node inside the engine. Never reused within one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Another node (a tone feeding a gain).
    Node(NodeId),
    /// The engine's speakers.
    Output,
}

/// Control-plane requests from the UI thread to the renderer.
///
/// All variants are `Copy` so they can cross the lock-free queue without
/// allocating on either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    CreateTone {
        id: NodeId,
        waveform: Waveform,
        frequency: f32,
    },
    CreateGain {
        id: NodeId,
        value: f32,
    },
    Connect {
        source: NodeId,
        destination: Destination,
    },
    Start {
        tone: NodeId,
    },
    /// Approach `target` exponentially from `start_time` (engine seconds).
    SetTarget {
        gain: NodeId,
        target: f32,
        start_time: f64,
        time_constant: f64,
    },
    Stop {
        tone: NodeId,
    },
    Disconnect {
        node: NodeId,
    },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineCommand>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        Consumer::pop(self).ok()
    }
}

/// Sending half of the command queue.
///
/// When the ring is full (the callback is stalled, or the stream never
/// started) commands wait in a local backlog and go out in order on the next
/// [`Outbox::send`] or [`Outbox::flush`]. A dropped `Stop` would leave its
/// nodes in the renderer for good, so commands are only discarded once the
/// backlog itself is full, and every discard is counted.
#[cfg(feature = "rtrb")]
pub struct Outbox {
    tx: Producer<EngineCommand>,
    backlog: VecDeque<EngineCommand>,
    backlog_limit: usize,
    dropped: u64,
}

#[cfg(feature = "rtrb")]
impl Outbox {
    pub fn new(tx: Producer<EngineCommand>, backlog_limit: usize) -> Self {
        Self {
            tx,
            backlog: VecDeque::new(),
            backlog_limit,
            dropped: 0,
        }
    }

    pub fn send(&mut self, cmd: EngineCommand) {
        self.flush();
        if !self.backlog.is_empty() || self.tx.push(cmd).is_err() {
            self.defer(cmd);
        }
    }

    /// Move as much of the backlog into the ring as fits. Returns how many
    /// commands went out.
    pub fn flush(&mut self) -> usize {
        let mut sent = 0;
        while let Some(&cmd) = self.backlog.front() {
            if self.tx.push(cmd).is_err() {
                break;
            }
            self.backlog.pop_front();
            sent += 1;
        }
        sent
    }

    /// Commands waiting for room in the ring.
    pub fn backlog(&self) -> usize {
        self.backlog.len()
    }

    /// Commands discarded because the backlog was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn defer(&mut self, cmd: EngineCommand) {
        if self.backlog.len() >= self.backlog_limit {
            self.dropped += 1;
            log::warn!("engine command backlog full, dropped {cmd:?}");
            return;
        }
        if self.backlog.is_empty() {
            log::debug!("engine command queue full, deferring");
        }
        self.backlog.push_back(cmd);
    }
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use rtrb::RingBuffer;

    use super::*;

    fn stop(n: u64) -> EngineCommand {
        EngineCommand::Stop { tone: NodeId(n) }
    }

    #[test]
    fn full_ring_defers_in_order() {
        let (tx, mut rx) = RingBuffer::new(2);
        let mut outbox = Outbox::new(tx, 16);
        for n in 1..=4 {
            outbox.send(stop(n));
        }
        assert_eq!(outbox.backlog(), 2);
        assert_eq!(outbox.dropped(), 0);

        assert_eq!(MessageReceiver::pop(&mut rx), Some(stop(1)));
        assert_eq!(MessageReceiver::pop(&mut rx), Some(stop(2)));
        assert_eq!(outbox.flush(), 2);
        assert_eq!(outbox.backlog(), 0);

        outbox.send(stop(5));
        assert_eq!(MessageReceiver::pop(&mut rx), Some(stop(3)));
        assert_eq!(MessageReceiver::pop(&mut rx), Some(stop(4)));
        assert_eq!(outbox.flush(), 1);
        assert_eq!(MessageReceiver::pop(&mut rx), Some(stop(5)));
        assert_eq!(MessageReceiver::pop(&mut rx), None);
    }

    #[test]
    fn full_backlog_counts_drops() {
        let (tx, _rx) = RingBuffer::new(1);
        let mut outbox = Outbox::new(tx, 2);
        for n in 1..=5 {
            outbox.send(stop(n));
        }
        assert_eq!(outbox.backlog(), 2);
        assert_eq!(outbox.dropped(), 2);
    }
}
