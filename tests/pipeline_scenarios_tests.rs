use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use energy_tracker::config::PayloadSchema;
use energy_tracker::error::FetchError;
use energy_tracker::fetch::payload::decode_series;
use energy_tracker::model::series::{Series, TimeRange};
use energy_tracker::model::signal::Signal;
use energy_tracker::pipeline::{
    format_signal_line, format_sma_line, resolve_selection, run_cycle, FetchOutcome,
    PipelineOutcome, EMPTY_PAYLOAD_MESSAGE, EMPTY_SELECTION_MESSAGE,
};
use energy_tracker::strategy::ma_crossover::MaCrossover;

fn t(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 13, 10, 0, 0).unwrap() + Duration::minutes(minute)
}

/// Body with one record per minute from 10:00, prices 1.0, 2.0, ...
fn rising_body(n: usize) -> String {
    let records: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"timestamp": "{}", "price": {}.0, "volume": {}}}"#,
                t(i as i64).to_rfc3339(),
                i + 1,
                100 + i
            )
        })
        .collect();
    format!(r#"{{"data": [{}]}}"#, records.join(","))
}

fn fetched(body: &str) -> Result<Arc<Series>, FetchError> {
    decode_series(body, &PayloadSchema::default()).map(Arc::new)
}

#[test]
fn empty_api_payload_reports_status_and_no_snapshot() {
    let outcome = run_cycle(&fetched(r#"{"data": []}"#), None, &MaCrossover::default());
    assert!(matches!(outcome, PipelineOutcome::EmptyPayload));
    assert_eq!(outcome.status_message().as_deref(), Some(EMPTY_PAYLOAD_MESSAGE));
    assert!(outcome.snapshot().is_none());
    assert!(outcome.bounds().is_none());
}

#[test]
fn twenty_rising_points_signal_buy() {
    let outcome = run_cycle(&fetched(&rising_body(20)), None, &MaCrossover::default());
    let snapshot = outcome.snapshot().expect("ready");

    assert_eq!(snapshot.series.len(), 20);
    assert_eq!(snapshot.bounds, TimeRange::new(t(0), t(19)));
    assert_eq!(snapshot.selection, snapshot.bounds);
    assert_eq!(snapshot.signal.sma_fast, Some(18.0));
    assert_eq!(snapshot.signal.sma_slow, Some(13.0));
    assert_eq!(snapshot.signal.signal, Signal::Buy);
    assert_eq!(outcome.status_message(), None);

    assert_eq!(format_signal_line(&snapshot.signal), "Latest Signal: Buy");
    assert_eq!(
        format_sma_line(&snapshot.signal, 5, 15),
        "SMA (5): 18.00 | SMA (15): 13.00"
    );
}

#[test]
fn selection_outside_data_reports_empty_range() {
    let next_day = TimeRange::new(t(24 * 60), t(24 * 60 + 30));
    let outcome = run_cycle(
        &fetched(&rising_body(20)),
        Some(next_day),
        &MaCrossover::default(),
    );
    assert!(matches!(outcome, PipelineOutcome::EmptySelection { .. }));
    assert_eq!(outcome.status_message().as_deref(), Some(EMPTY_SELECTION_MESSAGE));
    assert!(outcome.snapshot().is_none());
    assert_eq!(outcome.bounds(), Some(TimeRange::new(t(0), t(19))));
}

#[test]
fn selection_between_points_reports_empty_range() {
    let body = format!(
        r#"{{"data": [
            {{"timestamp": "{}", "price": 1, "volume": 1}},
            {{"timestamp": "{}", "price": 2, "volume": 1}}
        ]}}"#,
        t(0).to_rfc3339(),
        t(10).to_rfc3339()
    );
    let gap = TimeRange::new(t(2), t(5));
    let outcome = run_cycle(&fetched(&body), Some(gap), &MaCrossover::default());
    assert!(matches!(outcome, PipelineOutcome::EmptySelection { .. }));
}

#[test]
fn fetch_failure_short_circuits() {
    let outcome = run_cycle(&Err(FetchError::Timeout), None, &MaCrossover::default());
    assert!(matches!(outcome, PipelineOutcome::FetchFailed(FetchError::Timeout)));
    assert_eq!(
        outcome.status_message().as_deref(),
        Some("Error fetching data: request timed out")
    );
}

#[test]
fn short_selection_is_insufficient_not_an_error() {
    let window = TimeRange::new(t(10), t(19));
    let outcome = run_cycle(&fetched(&rising_body(20)), Some(window), &MaCrossover::default());
    let snapshot = outcome.snapshot().expect("ready");
    assert_eq!(snapshot.series.len(), 10);
    assert_eq!(snapshot.signal.signal, Signal::Insufficient);
    assert_eq!(snapshot.signal.sma_slow, None);
    assert_eq!(
        format_sma_line(&snapshot.signal, 5, 15),
        "SMA (5): 18.00 | SMA (15): ---"
    );
}

#[test]
fn unsorted_payload_is_sorted_before_signal() {
    let mut records: Vec<String> = (0..20)
        .map(|i| {
            format!(
                r#"{{"timestamp": "{}", "price": {}, "volume": 1}}"#,
                t(i).to_rfc3339(),
                i + 1
            )
        })
        .collect();
    records.reverse();
    let body = format!(r#"{{"data": [{}]}}"#, records.join(","));

    let outcome = run_cycle(&fetched(&body), None, &MaCrossover::default());
    let snapshot = outcome.snapshot().expect("ready");
    assert_eq!(snapshot.series.points()[0].timestamp, t(0));
    assert_eq!(snapshot.signal.signal, Signal::Buy);
}

#[test]
fn selection_defaults_to_full_range_and_clamps_prior_choice() {
    let bounds = TimeRange::new(t(0), t(19));
    assert_eq!(resolve_selection(&bounds, None), bounds);
    assert_eq!(
        resolve_selection(&bounds, Some(TimeRange::new(t(-30), t(5)))),
        TimeRange::new(t(0), t(5))
    );
    assert_eq!(
        resolve_selection(&bounds, Some(TimeRange::new(t(3), t(90)))),
        TimeRange::new(t(3), t(19))
    );
    assert!(resolve_selection(&bounds, Some(TimeRange::new(t(40), t(50)))).is_inverted());
}

#[test]
fn fetch_outcome_separates_empty_from_failure() {
    assert!(matches!(
        FetchOutcome::classify(&fetched(r#"{"data": []}"#)),
        FetchOutcome::Empty
    ));
    assert!(matches!(
        FetchOutcome::classify(&fetched(&rising_body(1))),
        FetchOutcome::Data(_)
    ));
    assert!(matches!(
        FetchOutcome::classify(&Err(FetchError::Status(500))),
        FetchOutcome::Failed(FetchError::Status(500))
    ));
}
