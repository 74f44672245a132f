//! Payload coercion between Zoho records and agent records
//!
//! Reads coerce per property type: non-string values of String properties
//! become their JSON text, and Json properties are wrapped as
//! `{"Data": value}`. Write-back reverses the envelope and turns lookup
//! values into `{"id": ...}` references.

use crate::error::{Error, Result};
use crate::schema::{PropertyType, Schema};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;

/// Member name of the Json property envelope
pub const DATA_ENVELOPE: &str = "Data";

/// Map a raw Zoho record onto the schema's properties
///
/// Every property appears in the output; absent values are null.
pub fn record_from_source(schema: &Schema, raw: &JsonObject) -> JsonObject {
    let mut out = JsonObject::new();

    for property in &schema.properties {
        let source = raw.get(&property.id);
        let value = match property.property_type {
            PropertyType::String => match source {
                Some(JsonValue::String(s)) => JsonValue::String(s.clone()),
                Some(JsonValue::Null) | None => JsonValue::Null,
                Some(other) => JsonValue::String(other.to_string()),
            },
            PropertyType::Json => match source {
                Some(value) => json!({ DATA_ENVELOPE: value }),
                None => JsonValue::Null,
            },
            _ => source.cloned().unwrap_or(JsonValue::Null),
        };
        out.insert(property.id.clone(), value);
    }

    out
}

/// Build the object sent to Zoho for a write-back payload
///
/// Only schema properties with non-null values are sent.
pub fn put_object(schema: &Schema, payload: &JsonObject) -> JsonObject {
    let mut out = JsonObject::new();

    for property in &schema.properties {
        let value = match payload.get(&property.id) {
            Some(JsonValue::Null) | None => continue,
            Some(value) => value,
        };

        let mapped = match property.property_type {
            PropertyType::String if property.is_lookup() => lookup_reference(value),
            PropertyType::Json => match value {
                JsonValue::Object(map) if map.contains_key(DATA_ENVELOPE) => {
                    map.get(DATA_ENVELOPE).cloned().unwrap_or(JsonValue::Null)
                }
                other => other.clone(),
            },
            _ => value.clone(),
        };
        out.insert(property.id.clone(), mapped);
    }

    out
}

/// An object is passed through; anything else is taken as the record id
fn lookup_reference(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(_) => value.clone(),
        JsonValue::String(text) => match serde_json::from_str::<JsonValue>(text) {
            Ok(parsed @ JsonValue::Object(_)) => parsed,
            _ => json!({ "id": text }),
        },
        other => json!({ "id": other.to_string() }),
    }
}

/// Parse a Zoho timestamp
///
/// Zoho sends RFC 3339 with an offset; naive values are taken as UTC.
pub fn parse_timestamp(value: &JsonValue) -> Result<DateTime<Utc>> {
    let text = match value {
        JsonValue::String(s) => s.as_str(),
        other => {
            return Err(Error::decode(format!("timestamp is not a string: {other}")));
        }
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(Error::decode(format!("invalid timestamp: {text}")))
}

/// Whether the stored record is at least as new as the incoming one
///
/// `false` when either side lacks a value for the counter.
pub fn source_is_newer(payload: &JsonObject, source: &JsonObject, counter: &str) -> Result<bool> {
    let (Some(incoming), Some(stored)) = (payload.get(counter), source.get(counter)) else {
        return Ok(false);
    };
    if incoming.is_null() || stored.is_null() {
        return Ok(false);
    }

    Ok(parse_timestamp(incoming)? <= parse_timestamp(stored)?)
}
