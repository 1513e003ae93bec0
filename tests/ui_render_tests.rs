use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use energy_tracker::error::FetchError;
use energy_tracker::event::AppEvent;
use energy_tracker::model::price_point::PricePoint;
use energy_tracker::model::series::{Series, TimeRange};
use energy_tracker::strategy::ma_crossover::MaCrossover;
use energy_tracker::ui::{self, AppState};

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn draw(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state))
        .expect("render should succeed");
    buffer_text(&terminal)
}

fn state() -> AppState {
    AppState::new(
        "https://example.test/intraday",
        MaCrossover::default(),
        Duration::minutes(15),
    )
}

fn rising(n: i64) -> Arc<Series> {
    let t0 = Utc.with_ymd_and_hms(2025, 2, 13, 10, 0, 0).unwrap();
    Arc::new(
        (0..n)
            .map(|i| PricePoint::new(t0 + Duration::minutes(i), (i + 1) as f64, 200.0 + i as f64))
            .collect::<Vec<_>>()
            .into(),
    )
}

#[test]
/// Before the first fetch lands the dashboard shows its frame and a
/// waiting hint instead of charts.
fn render_initial_state() {
    let text = draw(&state());
    assert!(text.contains("energy-tracker"));
    assert!(text.contains("Waiting for first refresh..."));
    assert!(text.contains("Latest Signal: ---"));
    assert!(!text.contains("Intraday Price"));
}

#[test]
fn render_ready_state_with_signal_and_charts() {
    let mut s = state();
    s.apply(AppEvent::FetchCompleted(Ok(rising(20))));
    let text = draw(&s);
    assert!(text.contains("Latest Signal: Buy"));
    assert!(text.contains("SMA (5): 18.00 | SMA (15): 13.00"));
    assert!(text.contains("Intraday Price"));
    assert!(text.contains("Intraday Volume"));
    assert!(text.contains("20 pts"));
    assert!(text.contains("02-13 10:00"));
    assert!(text.contains("02-13 10:19"));
}

#[test]
fn render_empty_payload_message() {
    let mut s = state();
    s.apply(AppEvent::FetchCompleted(Ok(Arc::new(Series::empty()))));
    let text = draw(&s);
    assert!(text.contains("No data received from the API."));
    assert!(text.contains("No data available at this time."));
    assert!(!text.contains("Intraday Price"));
}

#[test]
fn render_fetch_error_message() {
    let mut s = state();
    s.apply(AppEvent::FetchCompleted(Err(FetchError::Status(503))));
    let text = draw(&s);
    assert!(text.contains("Error fetching data: HTTP status 503"));
    assert!(!text.contains("Intraday Volume"));
}

#[test]
fn render_empty_selection_message() {
    let mut s = state();
    let t0 = Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap();
    s.selection = Some(TimeRange::new(t0, t0 + Duration::hours(1)));
    s.apply(AppEvent::FetchCompleted(Ok(rising(20))));
    let text = draw(&s);
    assert!(text.contains("No data in the selected time range."));
    assert!(!text.contains("Intraday Price"));
}

#[test]
fn render_fetching_indicator() {
    let mut s = state();
    assert!(s.begin_refresh());
    let text = draw(&s);
    assert!(text.contains("FETCHING"));
    assert!(text.contains("Fetching data..."));
}
