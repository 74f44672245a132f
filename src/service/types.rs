//! Request and response messages of the publisher service
//!
//! camelCase on the wire. Blobs such as `settingsJson` and
//! `oauthStateJson` are opaque strings; their content is defined next to
//! the types that parse them.

use crate::schema::{DiscoverMode, Schema};
use serde::{Deserialize, Serialize};

/// OAuth client registration supplied by the agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthConfiguration {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeginOAuthFlowRequest {
    pub configuration: OAuthConfiguration,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeginOAuthFlowResponse {
    pub authorization_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteOAuthFlowRequest {
    pub configuration: OAuthConfiguration,
    /// Redirect URL as received, including the `code` parameter
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteOAuthFlowResponse {
    pub oauth_state_json: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectRequest {
    pub settings_json: String,
    pub oauth_configuration: OAuthConfiguration,
    pub oauth_state_json: String,
}

/// Outcome of a Connect; at most one error is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectResponse {
    pub oauth_state_json: String,
    pub connection_error: String,
    pub oauth_error: String,
    pub settings_error: String,
}

impl ConnectResponse {
    pub fn is_connected(&self) -> bool {
        self.connection_error.is_empty() && self.oauth_error.is_empty() && self.settings_error.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoverSchemasRequest {
    pub mode: DiscoverMode,
    pub to_refresh: Vec<Schema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoverSchemasResponse {
    pub schemas: Vec<Schema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadRequest {
    pub job_id: String,
    pub schema: Schema,
    /// Maximum records to read; zero reads everything
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrepareWriteRequest {
    pub job_id: String,
    pub schema: Schema,
    /// Seconds allowed per record; zero means no limit
    pub commit_sla_seconds: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepareWriteResponse {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisconnectResponse {}
