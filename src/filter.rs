use chrono::{DateTime, Utc};

use crate::model::series::{Series, TimeRange};

/// Points with `start <= timestamp <= end`, sorted ascending by timestamp.
/// Ties keep their input order. An inverted range yields an empty series.
pub fn filter_range(series: &Series, start: DateTime<Utc>, end: DateTime<Utc>) -> Series {
    filter_to(series, &TimeRange::new(start, end))
}

pub fn filter_to(series: &Series, range: &TimeRange) -> Series {
    if range.is_inverted() {
        return Series::empty();
    }
    let mut points: Vec<_> = series
        .points()
        .iter()
        .filter(|p| range.contains(p.timestamp))
        .copied()
        .collect();
    points.sort_by_key(|p| p.timestamp);
    Series::new(points)
}
