pub mod chart;
pub mod dashboard;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Color;
use ratatui::Frame;

use crate::error::FetchError;
use crate::event::AppEvent;
use crate::input::UiCommand;
use crate::model::series::{Series, TimeRange};
use crate::pipeline::{self, PipelineOutcome};
use crate::refresh::RefreshGate;
use crate::strategy::ma_crossover::MaCrossover;

use chart::LineChart;
use dashboard::{KeybindBar, LogPanel, MessagePanel, RangePanel, SignalPanel, StatusBar};

const MAX_LOG_MESSAGES: usize = 200;

pub struct AppState {
    pub endpoint: String,
    pub strategy: MaCrossover,
    pub range_step: chrono::Duration,
    /// Most recent fetch result, kept so selection changes can re-run the
    /// filter and signal stages without another fetch.
    pub last_fetch: Option<Result<Arc<Series>, FetchError>>,
    /// User-chosen window; `None` follows the full data range.
    pub selection: Option<TimeRange>,
    /// Data range of the last successful evaluation.
    pub data_bounds: Option<TimeRange>,
    pub outcome: Option<PipelineOutcome>,
    pub gate: RefreshGate,
    pub last_updated: Option<DateTime<Utc>>,
    pub refresh_count: u64,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(endpoint: &str, strategy: MaCrossover, range_step: chrono::Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            strategy,
            range_step,
            last_fetch: None,
            selection: None,
            data_bounds: None,
            outcome: None,
            gate: RefreshGate::new(),
            last_updated: None,
            refresh_count: 0,
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.gate.in_flight()
    }

    /// Claim the fetch slot for a trigger. False means the trigger is dropped.
    pub fn begin_refresh(&mut self) -> bool {
        if self.gate.try_begin() {
            true
        } else {
            self.push_log(format!(
                "[WARN] Refresh skipped: fetch still running ({} dropped)",
                self.gate.dropped()
            ));
            false
        }
    }

    /// Release the fetch slot without a result, e.g. when the worker is gone.
    pub fn abort_refresh(&mut self, reason: &str) {
        self.gate.finish();
        self.push_log(format!("[ERR] {}", reason));
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::RefreshDue => {}
            AppEvent::FetchCompleted(result) => {
                self.gate.finish();
                self.refresh_count += 1;
                self.last_updated = Some(Utc::now());
                match &result {
                    Ok(series) => {
                        self.push_log(format!("Fetched {} records", series.len()));
                        self.follow_new_bounds(series);
                    }
                    Err(err) => {
                        self.push_log(format!("[ERR] Fetch failed: {}", err));
                    }
                }
                self.last_fetch = Some(result);
                self.reevaluate();
            }
        }
    }

    /// Ends of the selection that sat on the old data bounds move with them,
    /// so new observations stay inside the window.
    fn follow_new_bounds(&mut self, series: &Series) {
        let (Some(range), Some(old), Some(new)) =
            (self.selection, self.data_bounds, series.time_bounds())
        else {
            return;
        };
        self.selection = Some(range.follow_bounds(&old, &new));
    }

    pub fn apply_command(&mut self, cmd: UiCommand) {
        let step = self.range_step;
        match cmd {
            UiCommand::StartEarlier => self.nudge(|r, b| r.start = (r.start - step).max(b.start)),
            UiCommand::StartLater => self.nudge(|r, _| r.start = (r.start + step).min(r.end)),
            UiCommand::EndEarlier => self.nudge(|r, _| r.end = (r.end - step).max(r.start)),
            UiCommand::EndLater => self.nudge(|r, b| r.end = (r.end + step).min(b.end)),
            UiCommand::ResetRange => {
                self.selection = None;
                self.reevaluate();
                self.push_log("Range reset to full data".to_string());
            }
            UiCommand::Quit | UiCommand::Refresh => {}
        }
    }

    fn nudge(&mut self, adjust: impl FnOnce(&mut TimeRange, &TimeRange)) {
        let (Some(outcome), Some(_)) = (&self.outcome, &self.last_fetch) else {
            return;
        };
        let (Some(bounds), Some(mut range)) = (outcome.bounds(), outcome.selection()) else {
            return;
        };
        if range.is_inverted() {
            range = bounds;
        }
        adjust(&mut range, &bounds);
        self.selection = Some(range);
        self.reevaluate();
    }

    /// Re-run the filter and signal stages over the last fetch result.
    pub fn reevaluate(&mut self) {
        let Some(fetched) = &self.last_fetch else {
            return;
        };
        let outcome = pipeline::run_cycle(fetched, self.selection, &self.strategy);
        let previous = self.outcome.as_ref().and_then(PipelineOutcome::status_message);
        let current = outcome.status_message();
        if current.is_some() && current != previous {
            if let Some(msg) = &current {
                self.push_log(format!("[WARN] {}", msg));
            }
        }
        if let Some(bounds) = outcome.bounds() {
            self.data_bounds = Some(bounds);
        }
        tracing::info!(outcome = outcome.kind(), "Pipeline evaluated");
        self.outcome = Some(outcome);
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // range
            Constraint::Length(4), // signal
            Constraint::Min(8),    // charts or message
            Constraint::Length(6), // system log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            endpoint: &state.endpoint,
            fetching: state.is_fetching(),
            last_updated: state.last_updated,
            refresh_count: state.refresh_count,
        },
        outer[0],
    );

    let outcome = state.outcome.as_ref();
    frame.render_widget(
        RangePanel {
            bounds: outcome.and_then(PipelineOutcome::bounds),
            selection: outcome.and_then(PipelineOutcome::selection),
            points: outcome.and_then(PipelineOutcome::snapshot).map(|s| s.series.len()),
            follows_data: state.selection.is_none(),
        },
        outer[1],
    );

    let snapshot = outcome.and_then(PipelineOutcome::snapshot);
    frame.render_widget(
        SignalPanel::new(
            snapshot.map(|s| &s.signal),
            state.strategy.fast_period(),
            state.strategy.slow_period(),
        ),
        outer[2],
    );

    match snapshot {
        Some(snapshot) => {
            let charts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(outer[3]);
            let prices = snapshot.series.price_column();
            let volumes = snapshot.series.volume_column();
            let (fast, slow) = state.strategy.overlays(&snapshot.series);
            frame.render_widget(
                LineChart::new(" Intraday Price ", &prices)
                    .color(Color::Cyan)
                    .overlay(&fast, Color::Green)
                    .overlay(&slow, Color::Yellow)
                    .fast_sma(snapshot.signal.sma_fast)
                    .slow_sma(snapshot.signal.sma_slow),
                charts[0],
            );
            frame.render_widget(
                LineChart::new(" Intraday Volume ", &volumes).color(Color::Magenta),
                charts[1],
            );
        }
        None => {
            let message = match outcome {
                Some(outcome) => outcome.status_message(),
                None if state.is_fetching() => Some("Fetching data...".to_string()),
                None => None,
            };
            let detail = match outcome {
                Some(PipelineOutcome::FetchFailed(_)) | Some(PipelineOutcome::EmptyPayload) => {
                    Some(pipeline::NO_DATA_MESSAGE)
                }
                _ => None,
            };
            frame.render_widget(MessagePanel::new(message.as_deref(), detail), outer[3]);
        }
    }

    frame.render_widget(LogPanel::new(&state.log_messages), outer[4]);
    frame.render_widget(KeybindBar, outer[5]);
}
