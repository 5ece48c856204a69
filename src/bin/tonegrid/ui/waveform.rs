//! Output scope: the engine's mono mix, scaled to the master gain

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Smallest vertical range, so a muted keyboard still draws a flat line
const MIN_RANGE: f64 = 0.05;

/// Level readout for one scope window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeLevels {
    pub peak: f32,
    pub rms: f32,
}

impl ScopeLevels {
    pub fn measure(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let energy: f32 = samples.iter().map(|x| x * x).sum();
        Self {
            peak,
            rms: (energy / samples.len() as f32).sqrt(),
        }
    }

    /// Red when the device would clip, yellow when several keys sum above
    /// the master gain.
    fn color(&self, gain: f32) -> Color {
        if self.peak > 1.0 {
            Color::Red
        } else if self.peak > gain * 1.05 {
            Color::Yellow
        } else {
            Color::Cyan
        }
    }
}

/// Vertical half-range: one key at master gain fills most of the height
fn scope_range(gain: f32) -> f64 {
    (gain as f64 * 1.25).max(MIN_RANGE)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32], gain: f32) {
    let levels = ScopeLevels::measure(samples);
    let range = scope_range(gain);

    let block = Block::default()
        .title(format!(
            " Output  peak {:.3}  rms {:.3}  gain {gain:.3} ",
            levels.peak, levels.rms
        ))
        .borders(Borders::ALL);

    let step = 1.0 / samples.len().max(1) as f64;
    let points: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 * step, (s as f64).clamp(-range, range)))
        .collect();

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(levels.color(gain)))
        .data(&points);

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![trace])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, 1.0]).style(axis_style))
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(axis_style)
                .labels([
                    Span::raw(format!("{:.2}", -range)),
                    Span::raw("0"),
                    Span::raw(format!("{range:.2}")),
                ]),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_of_a_square_wave() {
        let samples: Vec<f32> = (0..64).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let levels = ScopeLevels::measure(&samples);
        assert_eq!(levels.peak, 0.5);
        assert!((levels.rms - 0.5).abs() < 1e-6);
    }

    #[test]
    fn silence_measures_zero() {
        assert_eq!(ScopeLevels::measure(&[]), ScopeLevels { peak: 0.0, rms: 0.0 });
    }

    #[test]
    fn range_follows_gain_with_floor() {
        assert_eq!(scope_range(0.0), MIN_RANGE);
        assert!((scope_range(0.8) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn color_flags_stacked_keys_and_clipping() {
        let one_key = ScopeLevels { peak: 0.2, rms: 0.14 };
        let stacked = ScopeLevels { peak: 0.6, rms: 0.3 };
        let clipping = ScopeLevels { peak: 1.2, rms: 0.8 };
        assert_eq!(one_key.color(0.2), Color::Cyan);
        assert_eq!(stacked.color(0.2), Color::Yellow);
        assert_eq!(clipping.color(0.2), Color::Red);
    }
}
