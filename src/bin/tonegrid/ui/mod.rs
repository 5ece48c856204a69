//! TUI module for tonegrid
//!
//! Key grid, gain slider, status bar and an oscilloscope of the engine
//! output.

mod keys;
mod transport;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use tonegrid::{
    engine::EngineFactory,
    keyboard::{Direction, GainStep, Keyboard},
    tuning::{KeyIndex, KEY_COUNT, SEMITONES},
};

use keys::KeyGrid;
use transport::{render_slider, render_transport, slider_gain};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// How long quitting waits for release fades to finish
const FADE_OUT_TIMEOUT: Duration = Duration::from_secs(2);

const FRAME_TIME: Duration = Duration::from_millis(16);

/// UI application state
pub struct UiApp<F: EngineFactory> {
    keyboard: Keyboard<F>,
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    /// Key under the keyboard cursor
    cursor: KeyIndex,
    /// Areas from the last draw, for mouse hit-testing
    grid: KeyGrid,
    slider_area: Rect,
    should_quit: bool,
}

impl<F: EngineFactory> UiApp<F> {
    pub fn new(keyboard: Keyboard<F>, audio_rx: Consumer<f32>) -> Self {
        Self {
            keyboard,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            cursor: KeyIndex::REFERENCE,
            grid: KeyGrid::default(),
            slider_area: Rect::default(),
            should_quit: false,
        }
    }

    /// Run the UI event loop, then fade out whatever is still sounding
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.keyboard.tick();

            terminal.draw(|frame| self.render(frame))?;

            // Handle input (non-blocking, ~60fps)
            if event::poll(FRAME_TIME)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code)
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.fade_out(terminal)
    }

    fn fade_out(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.keyboard.shutdown();
        let deadline = Instant::now() + FADE_OUT_TIMEOUT;

        while !self.keyboard.is_idle() && Instant::now() < deadline {
            self.poll_audio();
            self.keyboard.tick();
            terminal.draw(|frame| self.render(frame))?;
            std::thread::sleep(FRAME_TIME);
        }

        if !self.keyboard.is_idle() {
            log::warn!("quit before all release fades finished");
        }
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        // Read as many samples as available, keeping last VIS_BUFFER_SIZE
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.audio_rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.keyboard.toggle(self.cursor);
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-(SEMITONES as isize)),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(SEMITONES as isize),
            KeyCode::Char('p') | KeyCode::Char('P') => self.keyboard.pause_all(),
            KeyCode::Char('m') | KeyCode::Char('M') => self.keyboard.toggle_mute(),
            KeyCode::Char('-') => self.keyboard.adjust_gain(GainStep::Fine, Direction::Down),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.keyboard.adjust_gain(GainStep::Fine, Direction::Up)
            }
            KeyCode::Char('[') => self.keyboard.adjust_gain(GainStep::Medium, Direction::Down),
            KeyCode::Char(']') => self.keyboard.adjust_gain(GainStep::Medium, Direction::Up),
            KeyCode::Char('{') => self.keyboard.adjust_gain(GainStep::Coarse, Direction::Down),
            KeyCode::Char('}') => self.keyboard.adjust_gain(GainStep::Coarse, Direction::Up),
            KeyCode::Char('<') | KeyCode::Char(',') => self.nudge_pitch(-1.0),
            KeyCode::Char('>') | KeyCode::Char('.') => self.nudge_pitch(1.0),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = self.grid.hit(mouse.column, mouse.row) {
                    self.cursor = key;
                    self.keyboard.toggle(key);
                } else if let Some(gain) = slider_gain(self.slider_area, mouse.column, mouse.row)
                {
                    self.keyboard.set_gain(gain);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(gain) = slider_gain(self.slider_area, mouse.column, mouse.row) {
                    self.keyboard.set_gain(gain);
                }
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let next = (self.cursor.index() as isize + delta).clamp(0, KEY_COUNT as isize - 1);
        if let Some(key) = KeyIndex::new(next as usize) {
            self.cursor = key;
        }
    }

    fn nudge_pitch(&mut self, delta: f64) {
        let hz = (self.keyboard.reference_pitch() + delta).max(1.0);
        self.keyboard.set_reference_pitch(hz);
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Length(3),  // Gain slider
                Constraint::Min(9),     // Key grid
                Constraint::Length(8),  // Waveform
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.keyboard);

        self.slider_area = render_slider(frame, chunks[1], &self.keyboard);

        self.grid = KeyGrid::new(chunks[2]);
        self.grid.render(frame, &self.keyboard, self.cursor);

        render_waveform(frame, chunks[3], &self.audio_buffer, self.keyboard.gain());

        let help = Paragraph::new(
            " [Space] Toggle  [P] Pause all  [M] Mute  [-/+] ±0.001  [[/]] ±0.01  [{/}] ±0.1  [</>] A4 ±1Hz  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
