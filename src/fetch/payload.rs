use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::config::PayloadSchema;
use crate::error::FetchError;
use crate::model::price_point::PricePoint;
use crate::model::series::Series;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Decode a response body into a series. An empty record list is a valid,
/// empty series; any bad record fails the whole body.
pub fn decode_series(body: &str, schema: &PayloadSchema) -> Result<Series, FetchError> {
    let root: Value = serde_json::from_str(body)?;
    let root = root
        .as_object()
        .ok_or_else(|| FetchError::MalformedPayload("top level is not an object".to_string()))?;

    let records = root
        .get(&schema.records_field)
        .ok_or_else(|| {
            FetchError::MalformedPayload(format!("missing field `{}`", schema.records_field))
        })?
        .as_array()
        .ok_or_else(|| {
            FetchError::MalformedPayload(format!("`{}` is not an array", schema.records_field))
        })?;

    let points = records
        .iter()
        .enumerate()
        .map(|(index, record)| decode_record(index, record, schema))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Series::new(points))
}

fn decode_record(
    index: usize,
    record: &Value,
    schema: &PayloadSchema,
) -> Result<PricePoint, FetchError> {
    let obj = record.as_object().ok_or_else(|| FetchError::InvalidRecord {
        index,
        reason: "record is not an object".to_string(),
    })?;

    let raw_ts = field(obj, index, &schema.timestamp_field)?;
    let timestamp = raw_ts
        .as_str()
        .and_then(parse_timestamp)
        .ok_or_else(|| FetchError::InvalidTimestamp {
            index,
            value: raw_ts.as_str().map_or_else(|| raw_ts.to_string(), str::to_string),
        })?;

    let price = number(obj, index, &schema.price_field)?;
    let volume = number(obj, index, &schema.volume_field)?;

    Ok(PricePoint::new(timestamp, price, volume))
}

fn field<'a>(obj: &'a Map<String, Value>, index: usize, name: &str) -> Result<&'a Value, FetchError> {
    obj.get(name).ok_or_else(|| FetchError::InvalidRecord {
        index,
        reason: format!("missing field `{}`", name),
    })
}

fn number(obj: &Map<String, Value>, index: usize, name: &str) -> Result<f64, FetchError> {
    field(obj, index, name)?
        .as_f64()
        .ok_or_else(|| FetchError::InvalidRecord {
            index,
            reason: format!("field `{}` is not a number", name),
        })
}
