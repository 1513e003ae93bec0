use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::Event;
use tokio::sync::{mpsc, watch};

use energy_tracker::config::Config;
use energy_tracker::event::AppEvent;
use energy_tracker::fetch::{DataFetcher, FetchWorker, HttpPriceSource};
use energy_tracker::input::{parse_main_command, UiCommand};
use energy_tracker::refresh::spawn_refresh_trigger;
use energy_tracker::strategy::ma_crossover::MaCrossover;
use energy_tracker::ui::{self, AppState};

/// Ask the worker for a fetch if no other fetch is outstanding.
fn trigger_refresh(app_state: &mut AppState, worker: &FetchWorker) {
    if !app_state.begin_refresh() {
        return;
    }
    if !worker.request() {
        tracing::error!("Fetch worker is not running");
        app_state.abort_refresh("Fetch worker is not running");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists and is valid");
            std::process::exit(1);
        }
    };

    // Init tracing (log to file so it doesn't interfere with TUI)
    let log_file = std::fs::File::create("energy-tracker.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.logging.level.as_str())
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let request_timeout = config.source.request_timeout()?;
    let cache_ttl = config.effective_cache_ttl()?;
    let refresh_interval = config.ui.refresh_interval()?;
    let range_step = chrono::Duration::from_std(config.ui.range_step()?)
        .context("ui.range_step is out of range")?;

    tracing::info!(
        endpoint = %config.source.endpoint,
        refresh_ms = refresh_interval.as_millis() as u64,
        cache_ttl_ms = cache_ttl.as_millis() as u64,
        "Starting energy-tracker"
    );

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let endpoint = config.source.endpoint.clone();
    let schema = config.source.schema.clone();
    let worker = FetchWorker::spawn(
        move || {
            let source = HttpPriceSource::new(&endpoint, request_timeout)?;
            Ok(DataFetcher::new(source, schema, cache_ttl))
        },
        app_tx.clone(),
    )
    .context("failed to start fetch worker")?;

    let _refresh_task = spawn_refresh_trigger(app_tx.clone(), refresh_interval, shutdown_rx.clone());

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let strategy = MaCrossover::new(config.strategy.fast_period, config.strategy.slow_period);
    let mut app_state = AppState::new(&config.source.endpoint, strategy, range_step);
    app_state.push_log(format!(
        "energy-tracker started | refresh every {}s",
        refresh_interval.as_secs()
    ));

    // TUI main loop
    let mut terminal = ratatui::init();
    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.poll_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                match parse_main_command(&key.code) {
                    Some(UiCommand::Quit) => {
                        tracing::info!("User quit");
                        let _ = shutdown_tx.send(true);
                        break;
                    }
                    Some(UiCommand::Refresh) => {
                        app_state.push_log("Manual refresh".to_string());
                        trigger_refresh(&mut app_state, &worker);
                    }
                    Some(cmd) => app_state.apply_command(cmd),
                    None => {}
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            match evt {
                AppEvent::RefreshDue => trigger_refresh(&mut app_state, &worker),
                evt => app_state.apply(evt),
            }
        }

        // Check shutdown
        if *shutdown_rx.borrow() {
            break;
        }
    }

    ratatui::restore();
    tracing::info!(
        refreshes = app_state.refresh_count,
        dropped_triggers = app_state.gate.dropped(),
        "Shutdown complete"
    );
    println!("Goodbye! Check energy-tracker.log for details.");
    Ok(())
}
