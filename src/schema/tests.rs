//! Tests for schema types and discovery

use super::*;
use crate::auth::AuthConfig;
use crate::http::{HttpClient, HttpClientConfig};
use crate::zoho::{Field, Module, ZohoClient};
use serde_json::json;
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn field(json_type: Option<&str>, data_type: &str, length: Option<i64>) -> Field {
    Field {
        api_name: "Field".to_string(),
        field_label: "Field".to_string(),
        json_type: json_type.map(str::to_string),
        data_type: data_type.to_string(),
        length,
    }
}

fn client(server: &MockServer) -> ZohoClient {
    let config = HttpClientConfig::builder().max_retries(0).build();
    let http = HttpClient::with_auth(
        config,
        AuthConfig::Bearer {
            token: "tok".to_string(),
        },
    )
    .unwrap();
    ZohoClient::new(http, server.uri())
}

#[test_case(Some("boolean"), "boolean", None => PropertyType::Bool ; "boolean")]
#[test_case(Some("double"), "currency", None => PropertyType::Float ; "double")]
#[test_case(Some("integer"), "integer", None => PropertyType::Integer ; "integer")]
#[test_case(Some("jsonarray"), "multiselectpicklist", None => PropertyType::Json ; "json array")]
#[test_case(Some("jsonobject"), "lookup", None => PropertyType::Json ; "json object")]
#[test_case(Some("string"), "datetime", Some(120) => PropertyType::Datetime ; "datetime string")]
#[test_case(Some("string"), "textarea", Some(32000) => PropertyType::Text ; "long string")]
#[test_case(Some("string"), "text", Some(1024) => PropertyType::String ; "string at threshold")]
#[test_case(Some("string"), "email", None => PropertyType::String ; "string without length")]
#[test_case(None, "userlookup", None => PropertyType::Json ; "user lookup")]
#[test_case(Some("unknown"), "ownerlookup", None => PropertyType::String ; "fallback")]
fn test_property_type_for(json_type: Option<&str>, data_type: &str, length: Option<i64>) -> PropertyType {
    property_type_for(&field(json_type, data_type, length))
}

#[test]
fn test_build_schema() {
    let module = Module {
        api_name: "Leads".to_string(),
        module_name: "Leads Module".to_string(),
    };
    let fields = vec![
        Field {
            api_name: "Created_Time".to_string(),
            field_label: "Created Time".to_string(),
            json_type: Some("string".to_string()),
            data_type: "datetime".to_string(),
            length: None,
        },
        Field {
            api_name: "Modified_Time".to_string(),
            field_label: "Modified Time".to_string(),
            json_type: Some("string".to_string()),
            data_type: "datetime".to_string(),
            length: None,
        },
        Field {
            api_name: "Account_Name".to_string(),
            field_label: "Account Name".to_string(),
            json_type: Some("jsonobject".to_string()),
            data_type: "lookup".to_string(),
            length: None,
        },
    ];

    let schema = build_schema(&module, &fields);

    assert_eq!(schema.id, "Leads");
    assert_eq!(schema.name, "Leads");
    assert_eq!(schema.description, "Leads Module");
    assert_eq!(schema.data_flow_direction, DataFlowDirection::ReadWrite);
    assert_eq!(schema.publisher_meta_json, r#"{"Module":"Leads"}"#);
    assert_eq!(schema.module_name(), "Leads");
    assert_eq!(schema.properties.len(), 4);

    let key = &schema.properties[0];
    assert_eq!(key.id, "id");
    assert!(key.is_key);
    assert!(!key.is_nullable);
    assert_eq!(key.type_at_source, "id");

    assert!(schema.properties[1].is_create_counter);
    assert_eq!(schema.update_counter().unwrap().id, "Modified_Time");
    assert_eq!(schema.properties[2].name, "Modified Time");

    let lookup = schema.property("Account_Name").unwrap();
    assert_eq!(lookup.property_type, PropertyType::String);
    assert_eq!(lookup.type_at_source, "lookup");
    assert!(lookup.is_lookup());
    assert!(!schema.properties[1].is_lookup());
}

#[test]
fn test_module_name_falls_back_to_name() {
    let legacy = Schema {
        id: "Deals".to_string(),
        name: "Deals".to_string(),
        ..Default::default()
    };
    assert_eq!(legacy.module_name(), "Deals");

    let blank = Schema {
        name: "Deals".to_string(),
        publisher_meta_json: r#"{"Module":""}"#.to_string(),
        ..Default::default()
    };
    assert_eq!(blank.module_name(), "Deals");

    let routed = Schema {
        name: "My Deals".to_string(),
        publisher_meta_json: r#"{"Module":"Deals"}"#.to_string(),
        ..Default::default()
    };
    assert_eq!(routed.module_name(), "Deals");
}

#[test]
fn test_schema_wire_format() {
    let schema: Schema = serde_json::from_value(json!({
        "id": "Leads",
        "name": "Leads",
        "dataFlowDirection": "READ_WRITE",
        "properties": [{
            "id": "Modified_Time",
            "name": "Modified Time",
            "type": "DATETIME",
            "isUpdateCounter": true
        }]
    }))
    .unwrap();

    assert_eq!(schema.properties[0].property_type, PropertyType::Datetime);
    assert!(schema.properties[0].is_update_counter);
    assert!(schema.publisher_meta_json.is_empty());

    let out = serde_json::to_value(&schema).unwrap();
    assert_eq!(out["dataFlowDirection"], "READ_WRITE");
    assert_eq!(out["properties"][0]["type"], "DATETIME");
    assert_eq!(out["properties"][0]["typeAtSource"], "");
}

#[test]
fn test_filter_refresh_is_inner_join() {
    let schema = |id: &str| Schema {
        id: id.to_string(),
        ..Default::default()
    };

    let found = filter_refresh(
        vec![schema("Leads"), schema("Deals")],
        &[schema("Deals"), schema("Gone")],
    );
    let ids: Vec<_> = found.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["Deals"]);

    assert!(filter_refresh(vec![schema("Leads")], &[]).is_empty());
}

#[tokio::test]
async fn test_discover_skips_modules_without_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/modules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modules": [
                {"api_name": "Leads", "module_name": "Leads"},
                {"api_name": "Home", "module_name": "Home"},
                {"api_name": "Contacts", "module_name": "Contacts"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/settings/fields"))
        .and(query_param("module", "Leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [
                {"api_name": "Last_Name", "field_label": "Last Name", "json_type": "string", "data_type": "text", "length": 80},
                {"api_name": "Modified_Time", "field_label": "Modified Time", "json_type": "string", "data_type": "datetime"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/settings/fields"))
        .and(query_param("module", "Home"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/settings/fields"))
        .and(query_param("module", "Contacts"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let zoho = client(&server);

    let schemas = discover_schemas(&zoho, DiscoverMode::All, &[]).await.unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].id, "Leads");
    assert_eq!(schemas[0].properties.len(), 3);

    let wanted = Schema {
        id: "Contacts".to_string(),
        ..Default::default()
    };
    let refreshed = discover_schemas(&zoho, DiscoverMode::Refresh, &[wanted])
        .await
        .unwrap();
    assert!(refreshed.is_empty());
}

#[tokio::test]
async fn test_discover_fails_when_module_list_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/settings/modules"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = discover_schemas(&client(&server), DiscoverMode::All, &[]).await;
    assert!(matches!(
        result,
        Err(crate::Error::HttpStatus { status: 500, .. })
    ));
}
