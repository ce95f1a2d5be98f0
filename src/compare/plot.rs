//! Line plots of a difference signal, one chart per channel.
//!
//! Charts are drawn with ratatui into a plain [`Buffer`], so the same drawing
//! code backs both the text file written by [`write_plot`] and the interactive
//! terminal view.

use std::fs;
use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use crate::compare::{CompareResult, Difference};

/// Default plot width in terminal cells
pub const PLOT_WIDTH: u16 = 100;
/// Default height of each channel's chart in terminal cells
pub const CHANNEL_HEIGHT: u16 = 16;
/// Channels past this are left out of the plot
pub const MAX_PLOT_CHANNELS: usize = 32;

fn plotted_channels(diff: &Difference) -> usize {
    diff.signal.num_channels().clamp(1, MAX_PLOT_CHANNELS)
}

/// Reduces `samples` to at most `max_points` `(seconds, amplitude)` pairs,
/// keeping the largest-magnitude sample of each bucket so spikes survive.
pub fn decimate(samples: &[f32], sample_rate: u32, max_points: usize) -> Vec<(f64, f64)> {
    if samples.is_empty() || max_points == 0 {
        return Vec::new();
    }

    let bucket = samples.len().div_ceil(max_points);
    samples
        .chunks(bucket)
        .enumerate()
        .map(|(i, chunk)| {
            let (offset, &value) = chunk
                .iter()
                .enumerate()
                .fold((0, &chunk[0]), |best, (j, s)| {
                    if s.abs() > best.1.abs() {
                        (j, s)
                    } else {
                        best
                    }
                });
            let index = i * bucket + offset;
            (index as f64 / sample_rate as f64, value as f64)
        })
        .collect()
}

/// Draws a title line and one chart per channel of `diff` into `area`.
pub fn render_into(area: Rect, buf: &mut Buffer, diff: &Difference, title: &str) {
    let shown = plotted_channels(diff);
    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend((0..shown).map(|_| Constraint::Ratio(1, shown as u32)));
    let chunks = Layout::vertical(constraints).split(area);

    let total = diff.signal.num_channels();
    let heading = if total > shown {
        format!("{} (first {} of {} channels)", title, shown, total)
    } else {
        title.to_string()
    };
    Paragraph::new(Line::from(heading)).render(chunks[0], buf);

    let duration = diff.duration_sec().max(f64::EPSILON);
    for (ch, samples) in diff.signal.channels().iter().take(shown).enumerate() {
        let chart_area = chunks[ch + 1];
        let points = decimate(samples, diff.sample_rate, chart_area.width as usize * 2);

        let peak = diff.stats.get(ch).map_or(0.0, |s| s.peak as f64);
        let y_max = if peak > 0.0 { peak } else { 1.0 };

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let block = Block::default()
            .title(format!(" Channel {} ", ch + 1))
            .borders(Borders::ALL);

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Time (s)")
                    .bounds([0.0, duration])
                    .labels(vec!["0".to_string(), format!("{:.2}", duration)])
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .y_axis(
                Axis::default()
                    .title("Amplitude")
                    .bounds([-y_max, y_max])
                    .labels(vec![format!("{:.1e}", -y_max), format!("{:.1e}", y_max)])
                    .style(Style::default().fg(Color::DarkGray)),
            )
            .render(chart_area, buf);
    }
}

/// Renders the plot off-screen and returns it as text, one line per row.
pub fn render_plot(diff: &Difference, title: &str, width: u16, channel_height: u16) -> String {
    let channels = plotted_channels(diff) as u16;
    let height = channels.saturating_mul(channel_height).saturating_add(1);
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    render_into(area, &mut buf, diff, title);

    let mut text = String::with_capacity((area.width as usize + 1) * area.height as usize);
    for y in 0..area.height {
        let row: String = (0..area.width)
            .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect();
        text.push_str(row.trim_end());
        text.push('\n');
    }
    text
}

/// Writes [`render_plot`] output at the default size to `path`.
pub fn write_plot<P: AsRef<Path>>(path: P, diff: &Difference, title: &str) -> CompareResult<()> {
    let text = render_plot(diff, title, PLOT_WIDTH, CHANNEL_HEIGHT);
    fs::write(path.as_ref(), text)?;
    log::info!("wrote difference plot to {}", path.as_ref().display());
    Ok(())
}
