use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use energy_tracker::config::PayloadSchema;
use energy_tracker::error::FetchError;
use energy_tracker::fetch::source::PriceSource;
use energy_tracker::fetch::DataFetcher;

const TTL: Duration = Duration::from_secs(300);

/// Replays scripted responses and counts how often it was hit.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<String, FetchError>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                responses: Mutex::new(responses.into()),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl PriceSource for ScriptedSource {
    fn fetch_body(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
    }
}

fn body(n: usize) -> String {
    let records: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"timestamp": "2025-02-13T10:{:02}:00Z", "price": {}, "volume": 100}}"#,
                i,
                50 + i
            )
        })
        .collect();
    format!(r#"{{"data": [{}]}}"#, records.join(","))
}

fn fetcher(responses: Vec<Result<String, FetchError>>) -> (DataFetcher<ScriptedSource>, Arc<AtomicUsize>) {
    let (source, calls) = ScriptedSource::new(responses);
    (DataFetcher::new(source, PayloadSchema::default(), TTL), calls)
}

#[test]
fn calls_within_ttl_share_one_network_call() {
    let (fetcher, calls) = fetcher(vec![Ok(body(3))]);
    let t0 = Instant::now();

    let first = fetcher.fetch_at(t0).unwrap();
    let second = fetcher.fetch_at(t0 + Duration::from_secs(299)).unwrap();

    assert!(Arc::ptr_eq(&first, &second), "cache hit must return the same series");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.len(), 3);
}

#[test]
fn call_after_ttl_fetches_exactly_once_and_replaces_entry() {
    let (fetcher, calls) = fetcher(vec![Ok(body(1)), Ok(body(2))]);
    let t0 = Instant::now();

    assert_eq!(fetcher.fetch_at(t0).unwrap().len(), 1);
    assert_eq!(fetcher.last_fetched_at(), Some(t0));

    let t1 = t0 + Duration::from_secs(301);
    let refreshed = fetcher.fetch_at(t1).unwrap();
    assert_eq!(refreshed.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(fetcher.last_fetched_at(), Some(t1));

    let again = fetcher.fetch_at(t1 + Duration::from_secs(1)).unwrap();
    assert!(Arc::ptr_eq(&refreshed, &again));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn earlier_series_is_untouched_by_refresh() {
    let (fetcher, _) = fetcher(vec![Ok(body(1)), Ok(body(4))]);
    let t0 = Instant::now();

    let old = fetcher.fetch_at(t0).unwrap();
    let snapshot = (*old).clone();
    fetcher.fetch_at(t0 + TTL).unwrap();

    assert_eq!(*old, snapshot);
}

#[test]
fn empty_payload_is_a_cached_success() {
    let (fetcher, calls) = fetcher(vec![Ok(r#"{"data": []}"#.to_string())]);
    let t0 = Instant::now();

    assert!(fetcher.fetch_at(t0).unwrap().is_empty());
    assert!(fetcher.fetch_at(t0 + Duration::from_secs(10)).unwrap().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failures_are_not_cached() {
    let (fetcher, calls) = fetcher(vec![Err(FetchError::Status(503)), Ok(body(2))]);
    let t0 = Instant::now();

    assert_eq!(fetcher.fetch_at(t0), Err(FetchError::Status(503)));
    assert_eq!(fetcher.last_fetched_at(), None);

    let retried = fetcher.fetch_at(t0 + Duration::from_secs(1)).unwrap();
    assert_eq!(retried.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn malformed_payload_is_a_fetch_error() {
    let (fetcher, _) = fetcher(vec![Ok(r#"{"result": []}"#.to_string())]);
    assert!(matches!(
        fetcher.fetch_at(Instant::now()),
        Err(FetchError::MalformedPayload(_))
    ));
}

#[test]
fn failed_refresh_after_expiry_retries_on_next_call() {
    let (fetcher, calls) = fetcher(vec![Ok(body(2)), Err(FetchError::Timeout), Ok(body(5))]);
    let t0 = Instant::now();

    fetcher.fetch_at(t0).unwrap();
    let t1 = t0 + TTL + Duration::from_secs(1);
    assert_eq!(fetcher.fetch_at(t1), Err(FetchError::Timeout));
    // The old entry stays expired; the next call goes to the source again.
    assert_eq!(fetcher.fetch_at(t1).unwrap().len(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn wall_clock_fetch_hits_cache_on_second_call() {
    let (fetcher, calls) = fetcher(vec![Ok(body(2))]);
    let a = fetcher.fetch().unwrap();
    let b = fetcher.fetch().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
