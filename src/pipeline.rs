use std::sync::Arc;

use crate::error::FetchError;
use crate::filter::filter_to;
use crate::model::series::{Series, TimeRange};
use crate::model::signal::SignalState;
use crate::strategy::ma_crossover::MaCrossover;

pub const NO_DATA_MESSAGE: &str = "No data available at this time.";
pub const EMPTY_PAYLOAD_MESSAGE: &str = "No data received from the API.";
pub const EMPTY_SELECTION_MESSAGE: &str = "No data in the selected time range.";

/// What the fetch stage handed over. A valid empty payload is kept apart
/// from a failure so each gets its own message.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Data(Arc<Series>),
    Empty,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn classify(fetched: &Result<Arc<Series>, FetchError>) -> Self {
        match fetched {
            Ok(series) if series.is_empty() => FetchOutcome::Empty,
            Ok(series) => FetchOutcome::Data(Arc::clone(series)),
            Err(err) => FetchOutcome::Failed(err.clone()),
        }
    }
}

/// Everything the presentation layer needs from a successful cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Filtered and time-sorted.
    pub series: Series,
    /// Full span of the fetched data, i.e. the slider limits.
    pub bounds: TimeRange,
    pub selection: TimeRange,
    pub signal: SignalState,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    FetchFailed(FetchError),
    EmptyPayload,
    EmptySelection {
        bounds: TimeRange,
        selection: TimeRange,
    },
    Ready(Snapshot),
}

impl PipelineOutcome {
    pub fn status_message(&self) -> Option<String> {
        match self {
            PipelineOutcome::FetchFailed(err) => Some(format!("Error fetching data: {}", err)),
            PipelineOutcome::EmptyPayload => Some(EMPTY_PAYLOAD_MESSAGE.to_string()),
            PipelineOutcome::EmptySelection { .. } => Some(EMPTY_SELECTION_MESSAGE.to_string()),
            PipelineOutcome::Ready(_) => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            PipelineOutcome::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Slider limits, when any data was fetched.
    pub fn bounds(&self) -> Option<TimeRange> {
        match self {
            PipelineOutcome::Ready(snapshot) => Some(snapshot.bounds),
            PipelineOutcome::EmptySelection { bounds, .. } => Some(*bounds),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<TimeRange> {
        match self {
            PipelineOutcome::Ready(snapshot) => Some(snapshot.selection),
            PipelineOutcome::EmptySelection { selection, .. } => Some(*selection),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PipelineOutcome::FetchFailed(_) => "fetch_failed",
            PipelineOutcome::EmptyPayload => "empty_payload",
            PipelineOutcome::EmptySelection { .. } => "empty_selection",
            PipelineOutcome::Ready(_) => "ready",
        }
    }
}

/// Full range when nothing was chosen yet, otherwise the prior choice pulled
/// into the current bounds.
pub fn resolve_selection(bounds: &TimeRange, prior: Option<TimeRange>) -> TimeRange {
    prior.map_or(*bounds, |range| range.clamp_to(bounds))
}

/// Filter and signal stages over an already fetched result. Each stage that
/// comes back empty or failed ends the cycle.
pub fn run_cycle(
    fetched: &Result<Arc<Series>, FetchError>,
    prior_selection: Option<TimeRange>,
    strategy: &MaCrossover,
) -> PipelineOutcome {
    let series = match FetchOutcome::classify(fetched) {
        FetchOutcome::Failed(err) => return PipelineOutcome::FetchFailed(err),
        FetchOutcome::Empty => return PipelineOutcome::EmptyPayload,
        FetchOutcome::Data(series) => series,
    };
    let Some(bounds) = series.time_bounds() else {
        return PipelineOutcome::EmptyPayload;
    };

    let selection = resolve_selection(&bounds, prior_selection);
    let filtered = filter_to(&series, &selection);
    if filtered.is_empty() {
        tracing::debug!(
            start = %selection.start,
            end = %selection.end,
            "Selection matched no points"
        );
        return PipelineOutcome::EmptySelection { bounds, selection };
    }

    let signal = strategy.compute(&filtered);
    tracing::debug!(
        points = filtered.len(),
        signal = %signal.signal,
        sma_fast = ?signal.sma_fast,
        sma_slow = ?signal.sma_slow,
        "Computed signal"
    );
    PipelineOutcome::Ready(Snapshot {
        series: filtered,
        bounds,
        selection,
        signal,
    })
}

pub fn format_signal_line(state: &SignalState) -> String {
    format!("Latest Signal: {}", state.signal)
}

pub fn format_sma_line(state: &SignalState, fast_period: usize, slow_period: usize) -> String {
    let fmt = |v: Option<f64>| v.map_or_else(|| "---".to_string(), |v| format!("{:.2}", v));
    format!(
        "SMA ({}): {} | SMA ({}): {}",
        fast_period,
        fmt(state.sma_fast),
        slow_period,
        fmt(state.sma_slow)
    )
}
