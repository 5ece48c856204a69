//! Tonegrid - application builder and runner

use std::io::stdout;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use rtrb::RingBuffer;

use super::ui::UiApp;

use tonegrid::{
    config::KeyboardConfig, dsp::Waveform, engine::host::CpalEngine, keyboard::Keyboard,
};

/// Samples buffered between the audio callback and the oscilloscope.
const SCOPE_QUEUE_SIZE: usize = 8192;

/// Main application builder
pub struct Tonegrid {
    config: KeyboardConfig,
}

impl Tonegrid {
    pub fn new() -> Self {
        Self {
            config: KeyboardConfig::new(),
        }
    }

    /// Set the frequency of A4 in Hz
    pub fn reference_pitch(mut self, hz: f64) -> Self {
        self.config = self.config.reference_pitch(hz);
        self
    }

    /// Set the master gain on startup
    pub fn gain(mut self, gain: f32) -> Self {
        self.config = self.config.initial_gain(gain);
        self
    }

    /// Set the tone waveform (sine by default)
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.config = self.config.waveform(waveform);
        self
    }

    /// Run the application (takes over the terminal)
    ///
    /// The audio device is not opened until the first key is toggled.
    pub fn run(self) -> EyreResult<()> {
        let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
        let mut scope_tx = Some(scope_tx);
        let factory = move || CpalEngine::open(scope_tx.take());

        let keyboard = Keyboard::new(self.config, factory);
        let mut app = UiApp::new(keyboard, scope_rx);

        let mut terminal = ratatui::init();
        let result = execute!(stdout(), EnableMouseCapture)
            .wrap_err("failed to enable mouse capture")
            .and_then(|()| app.run(&mut terminal));

        // Always hand the terminal back, even if the UI failed
        let mouse = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result?;
        mouse.wrap_err("failed to disable mouse capture")
    }
}

impl Default for Tonegrid {
    fn default() -> Self {
        Self::new()
    }
}
