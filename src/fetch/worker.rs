use std::sync::mpsc as std_mpsc;
use std::thread;

use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::event::AppEvent;

use super::source::PriceSource;
use super::DataFetcher;

/// Runs a [`DataFetcher`] on its own OS thread so blocking HTTP never touches
/// the async runtime. Requests are served one at a time, in order; each
/// answer is delivered as [`AppEvent::FetchCompleted`].
pub struct FetchWorker {
    requests: std_mpsc::Sender<()>,
}

impl FetchWorker {
    /// `build` runs on the worker thread, so the HTTP client is created and
    /// dropped there as well.
    pub fn spawn<S, F>(build: F, events: mpsc::Sender<AppEvent>) -> std::io::Result<Self>
    where
        S: PriceSource + 'static,
        F: FnOnce() -> Result<DataFetcher<S>, FetchError> + Send + 'static,
    {
        let (requests, rx) = std_mpsc::channel::<()>();
        thread::Builder::new()
            .name("fetch-worker".to_string())
            .spawn(move || {
                let fetcher = build();
                if let Err(err) = &fetcher {
                    tracing::error!(error = %err, "Failed to initialise price source");
                }
                for () in rx.iter() {
                    let result = match &fetcher {
                        Ok(fetcher) => fetcher.fetch(),
                        Err(err) => Err(err.clone()),
                    };
                    if events.blocking_send(AppEvent::FetchCompleted(result)).is_err() {
                        break;
                    }
                }
                tracing::debug!("Fetch worker stopped");
            })?;
        Ok(Self { requests })
    }

    /// Queue one fetch. Returns false once the worker has stopped.
    pub fn request(&self) -> bool {
        self.requests.send(()).is_ok()
    }
}
