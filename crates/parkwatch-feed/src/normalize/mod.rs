//! Conversion of any known upstream payload into [`ParkingRecord`]s.
//!
//! Upstream data is treated as untrusted: missing fields default, numeric
//! strings are parsed, and a payload whose shape is not recognised yields
//! an empty list rather than an error.

mod fields;
mod wkt;

use parkwatch_core::{Occupancy, ParkingRecord, PayloadFormat};
use serde_json::{Map, Value};

use crate::adapters::RawPayload;
use crate::error::FormatError;

use fields::{field_map, FieldMap, ACCESSIBLE_SPACE_TYPE, REMARK_FREE, REMARK_OCCUPIED};

const ENVELOPE_KEY: &str = "contents";

/// Normalize a raw payload, logging and swallowing shape errors.
#[must_use]
pub fn normalize(payload: &RawPayload) -> Vec<ParkingRecord> {
    match try_normalize(&payload.body, payload.format) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(
                adapter = %payload.source,
                stage = "normalize",
                format = %payload.format,
                error = %e,
                "unrecognised payload shape; treating as empty"
            );
            Vec::new()
        }
    }
}

/// Normalize a payload body of the given format.
///
/// A `{"contents": "<json>"}` proxy envelope is unwrapped once before the
/// body is read as a list of records. Entries that are not JSON objects are
/// skipped.
///
/// # Errors
///
/// Returns [`FormatError`] when the (unwrapped) body is not a JSON array or
/// the envelope cannot be decoded.
pub fn try_normalize(
    body: &Value,
    format: PayloadFormat,
) -> Result<Vec<ParkingRecord>, FormatError> {
    let unwrapped;
    let body = match unwrap_envelope(body)? {
        Some(inner) => {
            unwrapped = inner;
            &unwrapped
        }
        None => body,
    };

    let Value::Array(items) = body else {
        return Err(FormatError::NotAList {
            found: json_kind(body),
        });
    };

    let map = field_map(format);
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| normalize_item(item, map))
        .collect())
}

fn unwrap_envelope(body: &Value) -> Result<Option<Value>, FormatError> {
    let Some(contents) = body.as_object().and_then(|obj| obj.get(ENVELOPE_KEY)) else {
        return Ok(None);
    };
    let Some(text) = contents.as_str() else {
        return Err(FormatError::EnvelopeNotString);
    };
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Ok(Some(Value::Array(Vec::new())));
    }
    serde_json::from_str(text)
        .map(Some)
        .map_err(FormatError::EnvelopeDecode)
}

fn normalize_item(item: &Map<String, Value>, map: &FieldMap) -> ParkingRecord {
    let polygon = first_text(item, map.wkt)
        .map(|text| wkt::parse_polygon(&text))
        .unwrap_or_default();

    let mut lat = number_or_zero(item, map.lat);
    let mut lon = number_or_zero(item, map.lon);
    if lat == 0.0 && lon == 0.0 {
        if let Some(center) = wkt::centroid(&polygon) {
            lat = center.lat;
            lon = center.lon;
        }
    }

    ParkingRecord {
        name: first_text(item, map.name),
        lat,
        lon,
        is_accessible: is_accessible(item, map),
        occupancy: occupancy(item, map),
        weekday_fee: first_text(item, map.weekday_fee),
        service_hours: first_text(item, map.service_hours),
        distance: first_value(item, map.distance)
            .and_then(parse_number)
            .filter(|d| *d >= 0.0),
        address: first_text(item, map.address),
        polygon,
    }
}

/// A present, parseable count decides. Otherwise the remark text decides,
/// and anything unrecognised is `Unknown` so it is never shown as free.
fn occupancy(item: &Map<String, Value>, map: &FieldMap) -> Occupancy {
    if let Some(value) = first_value(item, map.available) {
        return match parse_number(value) {
            Some(count) if count > 0.0 => Occupancy::Free,
            Some(_) => Occupancy::Occupied,
            None => Occupancy::Unknown,
        };
    }

    match first_text(item, map.remark).as_deref() {
        Some(REMARK_FREE) => Occupancy::Free,
        Some(REMARK_OCCUPIED) => Occupancy::Occupied,
        _ => Occupancy::Unknown,
    }
}

fn is_accessible(item: &Map<String, Value>, map: &FieldMap) -> bool {
    let by_type = first_value(item, map.space_type)
        .and_then(parse_number)
        .is_some_and(|code| (code - ACCESSIBLE_SPACE_TYPE).abs() < f64::EPSILON);

    let by_flag = first_value(item, map.accessible_flag).is_some_and(|v| match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "y" | "yes"),
        _ => false,
    });

    by_type || by_flag
}

/// First candidate key present with a non-null value.
fn first_value<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .find(|value| !value.is_null())
}

/// First candidate key present as non-blank text (numbers are stringified).
fn first_text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let text = match first_value(item, keys)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn number_or_zero(item: &Map<String, Value>, keys: &[&str]) -> f64 {
    first_value(item, keys).and_then(parse_number).unwrap_or(0.0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
