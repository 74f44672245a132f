//! Tests for the Zoho API client

use super::*;
use crate::auth::AuthConfig;
use crate::http::{HttpClient, HttpClientConfig};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ZohoClient {
    let config = HttpClientConfig::builder().max_retries(0).build();
    let http = HttpClient::with_auth(
        config,
        AuthConfig::Bearer {
            token: "tok".to_string(),
        },
    )
    .unwrap();
    ZohoClient::new(http, format!("{}/crm/v2/", server.uri()))
}

fn retrying_client(server: &MockServer, timeout: Duration) -> ZohoClient {
    let config = HttpClientConfig::builder()
        .timeout(timeout)
        .max_retries(3)
        .backoff(
            crate::types::BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
        .build();
    let http = HttpClient::with_auth(
        config,
        AuthConfig::Bearer {
            token: "tok".to_string(),
        },
    )
    .unwrap();
    ZohoClient::new(http, server.uri())
}

#[tokio::test]
async fn test_list_modules() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/settings/modules"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "modules": [
                {"api_name": "Leads", "module_name": "Leads", "generated_type": "default"},
                {"api_name": "Home", "module_name": "Home"}
            ]
        })))
        .mount(&server)
        .await;

    let modules = client(&server).list_modules().await.unwrap();
    let names: Vec<_> = modules.iter().map(|m| m.api_name.as_str()).collect();
    assert_eq!(names, vec!["Leads", "Home"]);
}

#[tokio::test]
async fn test_list_modules_failure_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/settings/modules"))
        .respond_with(ResponseTemplate::new(401).set_body_string("INVALID_TOKEN"))
        .mount(&server)
        .await;

    let zoho = client(&server);
    let err = zoho.list_modules().await.unwrap_err();
    assert!(matches!(err, crate::Error::HttpStatus { status: 401, .. }));
    assert!(zoho.check_access().await.is_err());
}

#[tokio::test]
async fn test_module_fields_absent_on_no_content_or_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/settings/fields"))
        .and(query_param("module", "Leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fields": [{
                "api_name": "Email",
                "field_label": "Email",
                "json_type": "string",
                "data_type": "email",
                "length": 100
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/settings/fields"))
        .and(query_param("module", "Contacts"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/settings/fields"))
        .and(query_param("module", "Home"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let zoho = client(&server);

    let fields = zoho.module_fields("Leads").await.unwrap().unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].json_type.as_deref(), Some("string"));
    assert_eq!(fields[0].length, Some(100));

    assert!(zoho.module_fields("Contacts").await.unwrap().is_none());
    assert!(zoho.module_fields("Home").await.unwrap().is_none());
}

#[tokio::test]
async fn test_records_page_passes_page_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}],
            "info": {"more_records": false, "page": 2}
        })))
        .mount(&server)
        .await;

    let mut params = HashMap::new();
    params.insert("page".to_string(), "2".to_string());

    let body = client(&server)
        .records_page("Leads", params)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["info"]["page"], 2);
}

#[tokio::test]
async fn test_record_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "42", "Modified_Time": "2020-01-01T00:00:00+00:00"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads/43"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let zoho = client(&server);
    let record = zoho.record_by_id("Leads", "42").await.unwrap().unwrap();
    assert_eq!(record["id"], "42");
    assert!(zoho.record_by_id("Leads", "43").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_sends_envelope_and_reads_row_status() {
    let server = MockServer::start().await;
    let mut object = serde_json::Map::new();
    object.insert("Last_Name".to_string(), json!("Smith"));

    Mock::given(method("POST"))
        .and(path("/crm/v2/Leads/upsert"))
        .and(body_json(json!({"data": [{"Last_Name": "Smith"}], "trigger": ["workflow"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "code": "MANDATORY_NOT_FOUND",
                "message": "required field not found",
                "status": "error",
                "details": {"api_name": "Company"}
            }]
        })))
        .mount(&server)
        .await;

    let response = client(&server)
        .upsert("Leads", &WriteEnvelope::single(object, true))
        .await
        .unwrap();

    assert_eq!(
        response.first_error().as_deref(),
        Some(r#"MANDATORY_NOT_FOUND: required field not found {"api_name":"Company"}"#)
    );
}

#[tokio::test]
async fn test_insert_failure_status_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/crm/v2/Leads"))
        .and(body_json(json!({"data": [{}], "trigger": []})))
        .respond_with(ResponseTemplate::new(400).set_body_string("INVALID_DATA"))
        .mount(&server)
        .await;

    let err = client(&server)
        .insert("Leads", &WriteEnvelope::single(serde_json::Map::new(), false))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 400: INVALID_DATA");
}

#[tokio::test]
async fn test_record_id_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/crm/v2/Leads/a%2Fb%3Fc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a/b?c"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server)
        .record_by_id("Leads", "a/b?c")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record["id"], "a/b?c");
}

#[tokio::test]
async fn test_timed_out_insert_is_sent_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Leads"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": [{"code": "SUCCESS", "status": "success"}]}))
                .set_delay(Duration::from_millis(800)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = retrying_client(&server, Duration::from_millis(200))
        .insert("Leads", &WriteEnvelope::single(serde_json::Map::new(), false))
        .await
        .unwrap_err();
    assert!(matches!(err, crate::Error::Timeout { .. }), "{err}");
}

#[tokio::test]
async fn test_failed_upsert_is_sent_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/Leads/upsert"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let err = retrying_client(&server, Duration::from_secs(5))
        .upsert("Leads", &WriteEnvelope::single(serde_json::Map::new(), false))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "HTTP 503: busy");
}

#[tokio::test]
async fn test_reads_are_still_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Leads/7"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Leads/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "7"}]})))
        .mount(&server)
        .await;

    let record = retrying_client(&server, Duration::from_secs(5))
        .record_by_id("Leads", "7")
        .await
        .unwrap();
    assert!(record.is_some());
}

#[test]
fn test_upsert_success_has_no_error() {
    let response: UpsertResponse = serde_json::from_value(json!({
        "data": [{"code": "SUCCESS", "message": "record updated", "status": "success", "details": {}}]
    }))
    .unwrap();
    assert!(response.first_error().is_none());
    assert!(UpsertResponse::default().first_error().is_none());
}
