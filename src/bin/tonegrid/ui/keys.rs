//! Key grid widget - one octave per row, twelve keys per row

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonegrid::{
    engine::EngineFactory,
    keyboard::Keyboard,
    tuning::{KeyIndex, NameStyle, OCTAVES, SEMITONES},
};

/// Cells narrower than this show the short note name only
const WIDE_CELL: u16 = 9;

/// Grid geometry for one draw
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyGrid {
    area: Rect,
    cell_width: u16,
    cell_height: u16,
}

impl KeyGrid {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            cell_width: area.width / SEMITONES as u16,
            cell_height: area.height / OCTAVES as u16,
        }
    }

    fn cell(&self, key: KeyIndex) -> Rect {
        Rect {
            x: self.area.x + key.semitone() as u16 * self.cell_width,
            y: self.area.y + key.octave() as u16 * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// Key under a terminal position
    pub fn hit(&self, column: u16, row: u16) -> Option<KeyIndex> {
        if self.cell_width == 0 || self.cell_height == 0 {
            return None;
        }
        if column < self.area.x || row < self.area.y {
            return None;
        }
        let col = ((column - self.area.x) / self.cell_width) as usize;
        let oct = ((row - self.area.y) / self.cell_height) as usize;
        if col >= SEMITONES || oct >= OCTAVES {
            return None;
        }
        KeyIndex::new(oct * SEMITONES + col)
    }

    pub fn render<F: EngineFactory>(
        &self,
        frame: &mut Frame,
        keyboard: &Keyboard<F>,
        cursor: KeyIndex,
    ) {
        if self.cell_width == 0 || self.cell_height == 0 {
            return;
        }

        let wide = self.cell_width >= WIDE_CELL;
        let boxed = self.cell_height >= 3;
        let inner_height = if boxed {
            self.cell_height - 2
        } else {
            self.cell_height
        };

        for key in KeyIndex::all() {
            let playing = keyboard.is_playing(key);
            let marker = if playing { "||" } else { "|>" };

            let short = keyboard.name(key, NameStyle::Short);
            let long = keyboard.name(key, NameStyle::Long);
            let hz = format!("~{:.0} Hz", keyboard.frequency(key));
            let lines: Vec<Line> = match (wide, inner_height) {
                (false, _) => vec![Line::from(format!("{marker}{short}"))],
                (true, 1) => vec![Line::from(format!("{marker} {long}"))],
                (true, 2) => vec![Line::from(format!("{marker} {long}")), Line::from(hz)],
                (true, _) => vec![Line::from(marker), Line::from(long.to_owned()), Line::from(hz)],
            };

            let mut style = Style::default();
            if playing {
                style = style.fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD);
            }
            if key == cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let mut paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(style);
            if boxed {
                let border = if key == cursor {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                paragraph = paragraph.block(Block::default().borders(Borders::ALL).border_style(border));
            }

            frame.render_widget(paragraph, self.cell(key));
        }
    }
}
