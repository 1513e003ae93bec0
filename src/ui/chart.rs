use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

/// Dot-plot of a time-indexed column. When there are more points than
/// columns the series is sampled evenly, so the whole range stays visible.
pub struct LineChart<'a> {
    title: &'a str,
    points: &'a [(DateTime<Utc>, f64)],
    color: Color,
    overlays: Vec<(&'a [Option<f64>], Color)>,
    fast_sma: Option<f64>,
    slow_sma: Option<f64>,
}

impl<'a> LineChart<'a> {
    pub fn new(title: &'a str, points: &'a [(DateTime<Utc>, f64)]) -> Self {
        Self {
            title,
            points,
            color: Color::Cyan,
            overlays: Vec::new(),
            fast_sma: None,
            slow_sma: None,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Extra per-point values (same length as `points`) drawn under the line.
    pub fn overlay(mut self, values: &'a [Option<f64>], color: Color) -> Self {
        self.overlays.push((values, color));
        self
    }

    pub fn fast_sma(mut self, val: Option<f64>) -> Self {
        self.fast_sma = val;
        self
    }

    pub fn slow_sma(mut self, val: Option<f64>) -> Self {
        self.slow_sma = val;
        self
    }
}

/// Indices of `len` points sampled onto `width` columns.
pub fn sample_indices(len: usize, width: usize) -> Vec<usize> {
    if len == 0 || width == 0 {
        return Vec::new();
    }
    if len <= width {
        return (0..len).collect();
    }
    if width == 1 {
        return vec![len - 1];
    }
    (0..width).map(|i| i * (len - 1) / (width - 1)).collect()
}

fn row_for(value: f64, min: f64, range: f64, chart_height: usize) -> usize {
    let normalized = ((value - min) / range).clamp(0.0, 1.0);
    chart_height - 1 - ((normalized * (chart_height - 1) as f64) as usize).min(chart_height - 1)
}

impl Widget for LineChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.points.is_empty() || inner.height < 3 || inner.width < 4 {
            return;
        }

        // Bottom row holds the time labels.
        let chart_height = inner.height.saturating_sub(1) as usize;
        let chart_width = inner.width as usize;
        let indices = sample_indices(self.points.len(), chart_width);

        let min_val = self.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_val = self
            .points
            .iter()
            .map(|p| p.1)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max_val - min_val;
        let range = if range < 0.01 { 1.0 } else { range };

        for (values, color) in &self.overlays {
            for (col, &idx) in indices.iter().enumerate() {
                let Some(v) = values.get(idx).copied().flatten() else {
                    continue;
                };
                let x = inner.x + col as u16;
                let y = inner.y + row_for(v, min_val, range, chart_height) as u16;
                buf.set_string(x, y, "·", Style::default().fg(*color));
            }
        }

        for (col, &idx) in indices.iter().enumerate() {
            let x = inner.x + col as u16;
            let y = inner.y + row_for(self.points[idx].1, min_val, range, chart_height) as u16;
            buf.set_string(x, y, "●", Style::default().fg(self.color));
        }

        // Latest averages on the last drawn column.
        let last_x = inner.x + indices.len() as u16 - 1;
        for (val, label, color) in [
            (self.fast_sma, "F", Color::Green),
            (self.slow_sma, "S", Color::Yellow),
        ] {
            if let Some(v) = val {
                if v >= min_val && v <= max_val {
                    let y = inner.y + row_for(v, min_val, range, chart_height) as u16;
                    buf.set_string(last_x, y, label, Style::default().fg(color));
                }
            }
        }

        let label_style = Style::default().fg(Color::DarkGray);
        buf.set_string(inner.x, inner.y, format!("{:.2}", max_val), label_style);
        buf.set_string(
            inner.x,
            inner.y + chart_height as u16 - 1,
            format!("{:.2}", min_val),
            label_style,
        );

        let label_y = inner.y + inner.height - 1;
        let first = self.points[0].0.format("%m-%d %H:%M").to_string();
        let last = self.points[self.points.len() - 1].0.format("%m-%d %H:%M").to_string();
        buf.set_string(inner.x, label_y, &first, label_style);
        if self.points.len() > 1 && chart_width > first.len() + last.len() {
            let x = inner.x + (chart_width - last.len()) as u16;
            buf.set_string(x, label_y, &last, label_style);
        }
    }
}
