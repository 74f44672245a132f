//! Zoho CRM v2 payloads
//!
//! Only the members the publisher reads are modelled; everything else in
//! Zoho's responses is ignored.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Entry of `GET settings/modules`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Module {
    /// Module name used in URLs (`Leads`)
    #[serde(default)]
    pub api_name: String,
    /// Display name
    #[serde(default)]
    pub module_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModulesResponse {
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Field descriptor from `GET settings/fields?module=M`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub api_name: String,
    #[serde(default)]
    pub field_label: String,
    /// JSON representation (`string`, `integer`, `jsonobject`, ...)
    #[serde(default)]
    pub json_type: Option<String>,
    /// Storage kind (`text`, `datetime`, `lookup`, ...)
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub length: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldsResponse {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Paging block of a record listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub more_records: bool,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Record listing or single-record fetch
#[derive(Debug, Default, Deserialize)]
pub struct RecordsResponse {
    #[serde(default)]
    pub data: Vec<JsonObject>,
    #[serde(default)]
    pub info: PageInfo,
}

/// Body of insert and upsert calls
#[derive(Debug, Clone, Serialize)]
pub struct WriteEnvelope {
    pub data: Vec<JsonObject>,
    pub trigger: Vec<String>,
}

impl WriteEnvelope {
    /// Envelope for one object, optionally firing workflow rules
    pub fn single(object: JsonObject, workflow_trigger: bool) -> Self {
        let trigger = if workflow_trigger {
            vec!["workflow".to_string()]
        } else {
            Vec::new()
        };
        Self {
            data: vec![object],
            trigger,
        }
    }
}

/// Per-row outcome of an insert or upsert
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertObject {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: JsonValue,
}

impl UpsertObject {
    /// `"<code>: <message> <details>"` when the row was rejected
    pub fn error_message(&self) -> Option<String> {
        (self.status == "error").then(|| format!("{}: {} {}", self.code, self.message, self.details))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpsertResponse {
    #[serde(default)]
    pub data: Vec<UpsertObject>,
}

impl UpsertResponse {
    /// Error of the first row, if it failed
    pub fn first_error(&self) -> Option<String> {
        self.data.first().and_then(UpsertObject::error_message)
    }
}
