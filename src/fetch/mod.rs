pub mod cache;
pub mod payload;
pub mod source;
pub mod worker;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::PayloadSchema;
use crate::error::FetchError;
use crate::model::series::Series;

use cache::TtlCache;
use source::PriceSource;

pub use source::HttpPriceSource;
pub use worker::FetchWorker;

/// Fetches the full series from a [`PriceSource`] and keeps the last good
/// result for `ttl`. The cache is a single slot: the fetch takes no
/// parameters.
pub struct DataFetcher<S> {
    source: S,
    schema: PayloadSchema,
    cache: Mutex<TtlCache<Arc<Series>>>,
}

impl<S: PriceSource> DataFetcher<S> {
    pub fn new(source: S, schema: PayloadSchema, ttl: Duration) -> Self {
        Self {
            source,
            schema,
            cache: Mutex::new(TtlCache::new(ttl)),
        }
    }

    pub fn fetch(&self) -> Result<Arc<Series>, FetchError> {
        self.fetch_at(Instant::now())
    }

    /// Serve from cache when fresh at `now`, otherwise hit the source once.
    /// Failures are returned but never cached, so the next call retries.
    pub fn fetch_at(&self, now: Instant) -> Result<Arc<Series>, FetchError> {
        // Held across the network call: concurrent callers wait and then
        // see the fresh entry instead of issuing a second request.
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(series) = cache.get(now) {
            tracing::debug!(records = series.len(), cache_hit = true, "Serving cached series");
            return Ok(series);
        }
        if cache.fetched_at().is_some() {
            tracing::info!(ttl_secs = cache.ttl().as_secs(), "Cached series expired");
        }

        let started = Instant::now();
        let result = self
            .source
            .fetch_body()
            .and_then(|body| payload::decode_series(&body, &self.schema));
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(series) => {
                tracing::info!(
                    source = %self.source.describe(),
                    records = series.len(),
                    elapsed_ms,
                    cache_hit = false,
                    "Fetched series"
                );
                let series = Arc::new(series);
                cache.store(Arc::clone(&series), now);
                Ok(series)
            }
            Err(err) => {
                tracing::warn!(
                    source = %self.source.describe(),
                    error = %err,
                    elapsed_ms,
                    "Fetch failed"
                );
                Err(err)
            }
        }
    }

    pub fn last_fetched_at(&self) -> Option<Instant> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fetched_at()
    }
}
