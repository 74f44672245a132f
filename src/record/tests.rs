//! Tests for record mapping

use super::*;
use crate::schema::{LookupMeta, Property, PropertyType, Schema};
use crate::types::JsonObject;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn property(id: &str, property_type: PropertyType) -> Property {
    Property {
        id: id.to_string(),
        name: id.to_string(),
        property_type,
        ..Default::default()
    }
}

fn schema() -> Schema {
    let mut lookup = property("Account_Name", PropertyType::String);
    lookup.publisher_meta_json = serde_json::to_string(&LookupMeta { is_lookup: true }).unwrap();

    let mut modified = property("Modified_Time", PropertyType::Datetime);
    modified.is_update_counter = true;

    Schema {
        id: "Leads".to_string(),
        name: "Leads".to_string(),
        properties: vec![
            property("id", PropertyType::String),
            property("Last_Name", PropertyType::String),
            property("Annual_Revenue", PropertyType::Float),
            property("Tag", PropertyType::Json),
            lookup,
            modified,
        ],
        ..Default::default()
    }
}

fn object(value: Value) -> JsonObject {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_record_from_source_coerces_per_type() {
    let raw = object(json!({
        "id": 3_652_397_000_000_123_u64,
        "Last_Name": "Smith",
        "Annual_Revenue": 1500.5,
        "Tag": [{"name": "hot"}],
        "Account_Name": {"name": "Zylker", "id": "77"},
        "Not_In_Schema": true
    }));

    let out = record_from_source(&schema(), &raw);

    assert_eq!(
        Value::Object(out),
        json!({
            "id": "3652397000000123",
            "Last_Name": "Smith",
            "Annual_Revenue": 1500.5,
            "Tag": {"Data": [{"name": "hot"}]},
            "Account_Name": r#"{"id":"77","name":"Zylker"}"#,
            "Modified_Time": null
        })
    );
}

#[test]
fn test_record_from_source_nulls() {
    let raw = object(json!({"Last_Name": null, "Tag": null}));
    let out = record_from_source(&schema(), &raw);

    assert_eq!(out["Last_Name"], Value::Null);
    assert_eq!(out["Tag"], json!({"Data": null}));
    assert_eq!(out["id"], Value::Null);
}

#[test]
fn test_put_object() {
    let payload = object(json!({
        "id": "42",
        "Last_Name": "Smith",
        "Annual_Revenue": null,
        "Tag": {"Data": [{"name": "hot"}]},
        "Account_Name": "77",
        "Unknown": "dropped"
    }));

    let out = put_object(&schema(), &payload);

    assert_eq!(
        Value::Object(out),
        json!({
            "id": "42",
            "Last_Name": "Smith",
            "Tag": [{"name": "hot"}],
            "Account_Name": {"id": "77"}
        })
    );
}

#[test]
fn test_put_object_lookup_variants() {
    let schema = schema();

    let from_text = put_object(
        &schema,
        &object(json!({"Account_Name": r#"{"id":"77","name":"Zylker"}"#})),
    );
    assert_eq!(from_text["Account_Name"], json!({"id": "77", "name": "Zylker"}));

    let from_object = put_object(&schema, &object(json!({"Account_Name": {"id": "77"}})));
    assert_eq!(from_object["Account_Name"], json!({"id": "77"}));

    let from_number = put_object(&schema, &object(json!({"Account_Name": 77})));
    assert_eq!(from_number["Account_Name"], json!({"id": "77"}));
}

#[test]
fn test_put_object_raw_json_passes_through() {
    let out = put_object(&schema(), &object(json!({"Tag": ["hot"]})));
    assert_eq!(out["Tag"], json!(["hot"]));
}

#[test]
fn test_parse_timestamp_formats() {
    let offset = parse_timestamp(&json!("2019-07-16T15:28:08+05:30")).unwrap();
    let utc = parse_timestamp(&json!("2019-07-16T09:58:08")).unwrap();
    assert_eq!(offset, utc);

    assert!(parse_timestamp(&json!("2019-07-16 09:58:08")).is_ok());
    assert!(parse_timestamp(&json!("2019-07-16")).is_ok());
    assert!(parse_timestamp(&json!("yesterday")).is_err());
    assert!(parse_timestamp(&json!(12)).is_err());
}

#[test]
fn test_source_is_newer() {
    let older = object(json!({"Modified_Time": "2020-01-01T00:00:00+00:00"}));
    let newer = object(json!({"Modified_Time": "2021-01-01T00:00:00+00:00"}));

    assert!(source_is_newer(&older, &newer, "Modified_Time").unwrap());
    assert!(source_is_newer(&older, &older, "Modified_Time").unwrap());
    assert!(!source_is_newer(&newer, &older, "Modified_Time").unwrap());

    let missing = object(json!({"Modified_Time": null}));
    assert!(!source_is_newer(&missing, &newer, "Modified_Time").unwrap());
    assert!(!source_is_newer(&older, &object(json!({})), "Modified_Time").unwrap());

    let garbage = object(json!({"Modified_Time": "not a date"}));
    assert!(source_is_newer(&garbage, &newer, "Modified_Time").is_err());
}

#[test]
fn test_record_wire_format() {
    let record: Record = serde_json::from_value(json!({
        "action": "UPSERT",
        "correlationId": "c-1",
        "dataJson": "{}"
    }))
    .unwrap();
    assert_eq!(record.correlation_id, "c-1");

    let ack = serde_json::to_value(RecordAck::failed("c-1", "timed out")).unwrap();
    assert_eq!(ack, json!({"correlationId": "c-1", "error": "timed out"}));
    assert!(RecordAck::ok("c-2").is_ok());
}
