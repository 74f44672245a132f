//! OAuth flow helpers
//!
//! Building the consent URL and exchanging the returned code for tokens.

use super::authenticator::TokenResponse;
use super::types::OAuthState;
use crate::error::{Error, Result};
use reqwest::Client;
use tracing::{error, info};
use url::Url;

/// Path of the consent page on the accounts server
pub const AUTHORIZE_PATH: &str = "/oauth/v2/auth";

/// Path of the token endpoint on the accounts server
pub const TOKEN_PATH: &str = "/oauth/v2/token";

/// Token endpoint for an accounts server base URL
pub fn token_url(accounts_base: &str) -> String {
    format!("{}{TOKEN_PATH}", accounts_base.trim_end_matches('/'))
}

/// Build the consent URL the user is sent to
///
/// Offline access with forced consent, so that Zoho always issues a
/// refresh token.
pub fn authorization_url(
    accounts_base: &str,
    client_id: &str,
    redirect_url: &str,
    scopes: &[String],
) -> Result<String> {
    let mut url = Url::parse(&format!(
        "{}{AUTHORIZE_PATH}",
        accounts_base.trim_end_matches('/')
    ))?;

    url.query_pairs_mut()
        .append_pair("scope", &scopes.join(","))
        .append_pair("client_id", client_id)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("redirect_uri", redirect_url)
        .append_pair("prompt", "consent");

    Ok(url.into())
}

/// Exchange the code carried by a redirect URL for an access/refresh pair
pub async fn exchange_code(
    client: &Client,
    accounts_base: &str,
    client_id: &str,
    client_secret: &str,
    redirect_url_with_code: &str,
) -> Result<OAuthState> {
    let mut redirect = Url::parse(redirect_url_with_code)?;
    let code = redirect
        .query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| Error::oauth2("redirect url did not contain an authorization code"))?;

    // The redirect_uri must match the registered one, without the query
    redirect.set_query(None);
    redirect.set_fragment(None);

    let params = [
        ("code", code.as_str()),
        ("redirect_uri", redirect.as_str()),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", "authorization_code"),
    ];

    let response = client
        .post(token_url(accounts_base))
        .query(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        error!("Authorization code exchange failed with status {status}");
        return Err(Error::OAuth2 {
            message: format!("Token request failed with status {status}: {body}"),
        });
    }

    let tokens: TokenResponse = response.json().await?;
    if let Some(err) = tokens.error {
        return Err(Error::oauth2(format!(
            "identity provider returned error: {err}"
        )));
    }

    let refresh_token = tokens.refresh_token.unwrap_or_default();
    if refresh_token.is_empty() {
        return Err(Error::config("Response did not contain a refresh token"));
    }

    info!("Got auth token and refresh token");

    Ok(OAuthState {
        auth_token: tokens.access_token.unwrap_or_default(),
        refresh_token,
    })
}
