//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing token refresh.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached access token for the refresh flow
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create an authenticator that shares the given HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.get_token().await?;
        Ok(req.bearer_auth(token))
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_token(&self) -> Result<String> {
        match &self.config {
            AuthConfig::Bearer { token } => Ok(token.clone()),
            AuthConfig::Oauth2Refresh { .. } => self.get_or_refresh_token().await,
        }
    }

    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await.map_err(|e| {
            error!("Failed to refresh access token: {e}");
            e
        })?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
            } => {
                self.fetch_oauth2_refresh(token_url, client_id, client_secret, refresh_token)
                    .await
            }
            AuthConfig::Bearer { .. } => Err(Error::auth(
                "Token refresh not supported for a static bearer token",
            )),
        }
    }

    /// Fetch an access token using the refresh token grant
    ///
    /// Zoho takes the grant parameters in the query string of a POST.
    async fn fetch_oauth2_refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<CachedToken> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "refresh_token"),
        ];

        debug!("Refreshing access token");

        let response = self
            .http_client
            .post(token_url)
            .query(&params)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        token_response
            .into_cached_token()
            .map_err(|message| Error::TokenRefresh { message })
    }
}

/// Zoho OAuth2 token response
///
/// Zoho reports some failures with a 200 and an `error` member, so every
/// field is optional.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) refresh_token: Option<String>,
    #[serde(default)]
    expires_in_sec: Option<i64>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

impl TokenResponse {
    /// Token lifetime in seconds
    ///
    /// Zoho's legacy `expires_in` is in milliseconds.
    pub(crate) fn ttl_seconds(&self) -> Option<i64> {
        self.expires_in_sec.or_else(|| {
            self.expires_in
                .map(|value| if value > 86_400 { value / 1000 } else { value })
        })
    }

    fn into_cached_token(self) -> std::result::Result<CachedToken, String> {
        if let Some(err) = self.error.as_deref() {
            return Err(format!("identity provider returned error: {err}"));
        }
        let ttl = self.ttl_seconds();
        let token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "response did not contain an access token".to_string())?;

        Ok(match ttl {
            Some(secs) => CachedToken::expires_in(token, secs),
            None => CachedToken::new(token, None),
        })
    }
}
