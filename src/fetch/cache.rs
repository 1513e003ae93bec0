use std::time::{Duration, Instant};

/// A cached value together with the instant it was fetched. Always replaced
/// as a unit.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
}

/// Single-slot cache that serves its value until `ttl` has elapsed since the
/// last store. There is no explicit invalidation.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<CacheEntry<T>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
    }

    /// The cached value, if it is still within its time-to-live at `now`.
    pub fn get(&self, now: Instant) -> Option<T> {
        if self.is_fresh(now) {
            self.slot.as_ref().map(|entry| entry.value.clone())
        } else {
            None
        }
    }

    pub fn store(&mut self, value: T, now: Instant) {
        self.slot = Some(CacheEntry {
            value,
            fetched_at: now,
        });
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.slot.as_ref().map(|entry| entry.fetched_at)
    }
}
