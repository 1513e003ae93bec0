use chrono::{DateTime, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::model::series::TimeRange;
use crate::model::signal::{Signal, SignalState};
use crate::pipeline::{format_signal_line, format_sma_line};

const RANGE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn signal_color(signal: Signal) -> Color {
    match signal {
        Signal::Buy => Color::Green,
        Signal::Sell => Color::Red,
        Signal::Hold => Color::Yellow,
        Signal::Insufficient => Color::DarkGray,
    }
}

pub struct SignalPanel<'a> {
    state: Option<&'a SignalState>,
    fast_period: usize,
    slow_period: usize,
}

impl<'a> SignalPanel<'a> {
    pub fn new(state: Option<&'a SignalState>, fast_period: usize, slow_period: usize) -> Self {
        Self {
            state,
            fast_period,
            slow_period,
        }
    }
}

impl Widget for SignalPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = match self.state {
            Some(state) => vec![
                Line::from(Span::styled(
                    format_signal_line(state),
                    Style::default()
                        .fg(signal_color(state.signal))
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format_sma_line(state, self.fast_period, self.slow_period),
                    Style::default().fg(Color::White),
                )),
            ],
            None => vec![Line::from(Span::styled(
                "Latest Signal: ---",
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let block = Block::default()
            .title(" Trading Simulation / Analytics ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct RangePanel {
    pub bounds: Option<TimeRange>,
    pub selection: Option<TimeRange>,
    pub points: Option<usize>,
    pub follows_data: bool,
}

impl Widget for RangePanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = match (self.bounds, self.selection) {
            (Some(bounds), Some(selection)) => {
                let mode = if self.follows_data { "full" } else { "custom" };
                Line::from(vec![
                    Span::styled("Range: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!(
                            "{} → {}",
                            selection.start.format(RANGE_FORMAT),
                            selection.end.format(RANGE_FORMAT)
                        ),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(format!(" ({}) ", mode), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!(
                            "| data {} → {}",
                            bounds.start.format(RANGE_FORMAT),
                            bounds.end.format(RANGE_FORMAT)
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        self.points
                            .map(|n| format!(" | {} pts", n))
                            .unwrap_or_default(),
                        Style::default().fg(Color::White),
                    ),
                ])
            }
            _ => Line::from(Span::styled(
                "Range: ---",
                Style::default().fg(Color::DarkGray),
            )),
        };

        let block = Block::default()
            .title(" Filter Data by Time ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(line).block(block).render(area, buf);
    }
}

/// Shown in place of the charts when a cycle ended early.
pub struct MessagePanel<'a> {
    message: Option<&'a str>,
    detail: Option<&'a str>,
}

impl<'a> MessagePanel<'a> {
    pub fn new(message: Option<&'a str>, detail: Option<&'a str>) -> Self {
        Self { message, detail }
    }
}

impl Widget for MessagePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::new();
        if let Some(msg) = self.message {
            lines.push(Line::from(Span::styled(
                msg,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }
        if let Some(detail) = self.detail {
            lines.push(Line::from(Span::styled(
                detail,
                Style::default().fg(Color::White),
            )));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Waiting for first refresh...",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default()
            .title(" Charts ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let visible = block.inner(area).height as usize;
        let start = self.messages.len().saturating_sub(visible);

        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub endpoint: &'a str,
    pub fetching: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub refresh_count: u64,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fetch_status = if self.fetching {
            Span::styled(
                " FETCHING ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(" IDLE ", Style::default().fg(Color::Green))
        };
        let updated = self
            .last_updated
            .map(|ts| ts.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        let line = Line::from(vec![
            Span::styled(
                " energy-tracker ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.endpoint, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            fetch_status,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("updated: {}", updated),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("refreshes: {}", self.refresh_count),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(" [Q]", Style::default().fg(Color::Yellow)),
            Span::styled("uit  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[R]", Style::default().fg(Color::Yellow)),
            Span::styled("efresh  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[←/→]", Style::default().fg(Color::Yellow)),
            Span::styled(" start  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[↓/↑]", Style::default().fg(Color::Yellow)),
            Span::styled(" end  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[A]", Style::default().fg(Color::Yellow)),
            Span::styled("ll data  ", Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
