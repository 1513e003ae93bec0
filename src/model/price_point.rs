use chrono::{DateTime, Utc};

/// One intraday observation from the price source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}
