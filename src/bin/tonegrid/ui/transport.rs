//! Status bar and gain slider widgets

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use tonegrid::{
    config::MAX_GAIN,
    engine::{EngineFactory, EngineStatus},
    keyboard::Keyboard,
};

/// Render the status bar: engine state, tuning, gain, voice counts
pub fn render_transport<F: EngineFactory>(frame: &mut Frame, area: Rect, keyboard: &Keyboard<F>) {
    let block = Block::default().title(" tonegrid ").borders(Borders::ALL);

    let (engine_str, engine_color) = match keyboard.engine_status() {
        EngineStatus::NotCreated => ("○ Press a key to start audio", Color::DarkGray),
        EngineStatus::Running => ("▶ Audio running", Color::Green),
        EngineStatus::Suspended => ("⏸ Audio suspended", Color::Yellow),
        EngineStatus::Unavailable => ("✕ No audio device", Color::Red),
    };

    let fading = keyboard.voices().pending_stops();

    let mut spans = vec![
        Span::styled(format!(" {engine_str}  "), Style::default().fg(engine_color)),
        Span::styled(
            format!("A4 = {:.1} Hz  ", keyboard.reference_pitch()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Gain: {:.3}  ", keyboard.gain()),
            Style::default().fg(Color::White),
        ),
    ];
    if keyboard.is_muted() {
        spans.push(Span::styled(
            format!("MUTED ({:.3})  ", keyboard.last_gain()),
            Style::default().fg(Color::Red),
        ));
    }
    spans.push(Span::styled(
        format!("Voices: {}", keyboard.live_voices()),
        Style::default().fg(Color::Magenta),
    ));
    if fading > 0 {
        spans.push(Span::styled(
            format!(" (+{fading} fading)"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let dropped = keyboard.dropped_commands();
    if dropped > 0 {
        spans.push(Span::styled(
            format!("  {dropped} commands lost"),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the gain slider; returns the clickable track area
pub fn render_slider<F: EngineFactory>(
    frame: &mut Frame,
    area: Rect,
    keyboard: &Keyboard<F>,
) -> Rect {
    let block = Block::default().title(" Gain ").borders(Borders::ALL);
    let track = block.inner(area);

    let ratio = (keyboard.gain() / MAX_GAIN).clamp(0.0, 1.0) as f64;
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(if keyboard.is_muted() {
            Color::DarkGray
        } else {
            Color::Cyan
        }))
        .ratio(ratio)
        .label(format!("{:.3} / {MAX_GAIN:.1}", keyboard.gain()));

    frame.render_widget(gauge, area);
    track
}

/// Gain for a click at (column, row), if it lands on the slider track
pub fn slider_gain(track: Rect, column: u16, row: u16) -> Option<f32> {
    if track.width == 0 || row < track.y || row >= track.y + track.height {
        return None;
    }
    if column < track.x || column >= track.x + track.width {
        return None;
    }
    let span = (track.width - 1).max(1) as f32;
    let ratio = (column - track.x) as f32 / span;
    Some((ratio * MAX_GAIN * 1000.0).round() / 1000.0)
}
