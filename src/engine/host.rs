//! Realtime engine on the default cpal output device.
//!
//! The UI thread holds the [`CpalEngine`]; the cpal callback owns the
//! [`Renderer`]. They share nothing but two lock-free queues (commands in,
//! scope samples out) and an atomic frame counter that serves as the engine
//! clock.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use super::{
    message::Outbox, renderer::Renderer, AudioEngine, EngineCommand, EngineState, NodeId,
};
use crate::{
    error::{EngineError, EngineResult},
    MAX_BLOCK_SIZE,
};

/// Capacity of the control queue. A full reconcile of every key issues
/// about six commands per key, so this covers several full sweeps.
pub const COMMAND_QUEUE_SIZE: usize = 4096;

/// Commands held on the UI side while the queue is full.
pub const COMMAND_BACKLOG_LIMIT: usize = 65_536;

pub struct CpalEngine {
    stream: cpal::Stream,
    outbox: Outbox,
    clock: Arc<AtomicU64>,
    sample_rate: f32,
    channels: usize,
    state: EngineState,
    next_id: u64,
}

impl CpalEngine {
    /// Open the default output device and start rendering.
    ///
    /// If `scope` is given, every rendered mono sample is also pushed into it
    /// (dropped when the consumer falls behind).
    pub fn open(scope: Option<Producer<f32>>) -> EngineResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let (tx, rx) = RingBuffer::<EngineCommand>::new(COMMAND_QUEUE_SIZE);
        let clock = Arc::new(AtomicU64::new(0));

        let callback = render_callback(Renderer::new(sample_rate), rx, scope, clock.clone(), channels);
        let stream = device
            .build_output_stream(
                &config.into(),
                callback,
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| EngineError::BuildStream(e.to_string()))?;

        // A stream that refuses to start is kept; the caller decides whether to resume.
        let state = match stream.play() {
            Ok(()) => EngineState::Running,
            Err(err) => {
                log::warn!("output stream did not start: {err}");
                EngineState::Suspended
            }
        };

        log::info!("output stream: {sample_rate} Hz, {channels} channels");

        Ok(Self {
            stream,
            outbox: Outbox::new(tx, COMMAND_BACKLOG_LIMIT),
            clock,
            sample_rate,
            channels,
            state,
            next_id: 0,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl AudioEngine for CpalEngine {
    fn current_time(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn resume(&mut self) -> EngineResult<()> {
        self.stream
            .play()
            .map_err(|e| EngineError::Play(e.to_string()))?;
        self.state = EngineState::Running;
        Ok(())
    }

    fn submit(&mut self, cmd: EngineCommand) {
        self.outbox.send(cmd);
    }

    fn flush(&mut self) {
        self.outbox.flush();
    }

    fn dropped_commands(&self) -> u64 {
        self.outbox.dropped()
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

fn render_callback(
    mut renderer: Renderer,
    mut rx: Consumer<EngineCommand>,
    mut scope: Option<Producer<f32>>,
    clock: Arc<AtomicU64>,
    channels: usize,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    move |data: &mut [f32], _| {
        renderer.drain(&mut rx);

        let total_frames = data.len() / channels.max(1);
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut render_buf[..frames_to_render];
            renderer.render(block);

            // Copy to output (mono to all channels)
            let out_off = frames_written * channels;
            for (i, &s) in block.iter().enumerate() {
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = s;
                }
            }

            if let Some(scope) = scope.as_mut() {
                for &s in block.iter() {
                    if scope.push(s).is_err() {
                        break;
                    }
                }
            }

            frames_written += frames_to_render;
        }

        clock.store(renderer.frame(), Ordering::Release);
    }
}
