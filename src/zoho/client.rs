//! Zoho CRM API client
//!
//! Thin routing layer over the authenticated `HttpClient`. Each call
//! classifies the raw response the way its caller needs it: discovery and
//! reads treat "no content" and failed lookups as absence, writes and the
//! module list treat them as errors.

use super::types::{
    Field, FieldsResponse, Module, ModulesResponse, RecordsResponse, UpsertResponse, WriteEnvelope,
};
use crate::error::{Error, Result};
use crate::http::{is_success_and_not_empty, status_error, HttpClient, RequestConfig};
use crate::types::{JsonObject, JsonValue};
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Client for the CRM v2 REST API
#[derive(Debug)]
pub struct ZohoClient {
    http: HttpClient,
    api_base: String,
}

impl ZohoClient {
    /// Create a client rooted at an API base such as `https://www.zohoapis.com/crm/v2`
    pub fn new(http: HttpClient, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    /// `{api}/{module}/{id}` with both segments percent-encoded
    fn record_url(&self, module: &str, id: &str) -> Result<String> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("Invalid API base URL: {}", self.api_base)))?
            .pop_if_empty()
            .push(module)
            .push(id);
        Ok(url.into())
    }

    /// Check that the credentials can reach the API
    pub async fn check_access(&self) -> Result<()> {
        let response = self.http.get(&self.url("settings/modules")).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    /// List the modules of the organisation
    pub async fn list_modules(&self) -> Result<Vec<Module>> {
        let response = self.http.get(&self.url("settings/modules")).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let modules: ModulesResponse = read_json(response).await?;
        Ok(modules.modules)
    }

    /// Field metadata of a module, `None` when Zoho has none to give
    pub async fn module_fields(&self, module: &str) -> Result<Option<Vec<Field>>> {
        let config = RequestConfig::new().query("module", module);
        let response = self
            .http
            .get_with_config(&self.url("settings/fields"), config)
            .await?;

        if !is_success_and_not_empty(response.status()) {
            debug!(
                "No fields for {module} (status {})",
                response.status().as_u16()
            );
            return Ok(None);
        }

        let fields: FieldsResponse = read_json(response).await?;
        Ok(Some(fields.fields))
    }

    /// One page of a module's records as the raw response body
    ///
    /// `None` when the listing is empty or the module cannot be listed.
    pub async fn records_page(
        &self,
        module: &str,
        params: HashMap<String, String>,
    ) -> Result<Option<JsonValue>> {
        let mut config = RequestConfig::new();
        for (key, value) in params {
            config = config.query(key, value);
        }

        let response = self.http.get_with_config(&self.url(module), config).await?;
        if !is_success_and_not_empty(response.status()) {
            debug!(
                "No records for {module} (status {})",
                response.status().as_u16()
            );
            return Ok(None);
        }

        read_json(response).await.map(Some)
    }

    /// Fetch a single record, `None` when it cannot be found
    pub async fn record_by_id(&self, module: &str, id: &str) -> Result<Option<JsonObject>> {
        let response = self.http.get(&self.record_url(module, id)?).await?;
        if !is_success_and_not_empty(response.status()) {
            return Ok(None);
        }

        let records: RecordsResponse = read_json(response).await?;
        Ok(records.data.into_iter().next())
    }

    /// Create a record
    pub async fn insert(&self, module: &str, envelope: &WriteEnvelope) -> Result<UpsertResponse> {
        self.write(&self.url(module), envelope).await
    }

    /// Insert or update a record keyed by its id
    pub async fn upsert(&self, module: &str, envelope: &WriteEnvelope) -> Result<UpsertResponse> {
        self.write(&self.url(&format!("{module}/upsert")), envelope)
            .await
    }

    /// Writes are sent once; a retried create could duplicate the record
    async fn write(&self, url: &str, envelope: &WriteEnvelope) -> Result<UpsertResponse> {
        let config = RequestConfig::new()
            .json(serde_json::to_value(envelope)?)
            .retries(0);
        let response = self.http.post_with_config(url, config).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body = response.bytes().await?;
        debug!("Write response: {}", String::from_utf8_lossy(&body));
        if body.is_empty() {
            return Ok(UpsertResponse::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
