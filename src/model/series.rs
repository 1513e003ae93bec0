use chrono::{DateTime, Utc};

use super::price_point::PricePoint;

/// Inclusive time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Carry each end that sat on `old` over to `new`. An end moved inside
    /// the old bounds stays where it was put.
    pub fn follow_bounds(&self, old: &TimeRange, new: &TimeRange) -> TimeRange {
        TimeRange {
            start: if self.start <= old.start { new.start } else { self.start },
            end: if self.end >= old.end { new.end } else { self.end },
        }
    }

    /// Pull both ends into `bounds`. A window with no overlap comes back
    /// inverted, so filtering with it yields nothing.
    pub fn clamp_to(&self, bounds: &TimeRange) -> TimeRange {
        TimeRange {
            start: self.start.max(bounds.start),
            end: self.end.min(bounds.end),
        }
    }
}

/// Time-indexed sequence of price points. Ingestion order is preserved;
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Earliest and latest timestamp, regardless of ordering.
    pub fn time_bounds(&self) -> Option<TimeRange> {
        let first = self.points.first()?.timestamp;
        let (start, end) = self
            .points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(p.timestamp), hi.max(p.timestamp)));
        Some(TimeRange { start, end })
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// `(timestamp, price)` pairs for the price chart.
    pub fn price_column(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.points.iter().map(|p| (p.timestamp, p.price)).collect()
    }

    /// `(timestamp, volume)` pairs for the volume chart.
    pub fn volume_column(&self) -> Vec<(DateTime<Utc>, f64)> {
        self.points.iter().map(|p| (p.timestamp, p.volume)).collect()
    }
}

impl From<Vec<PricePoint>> for Series {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}
