//! Authentication module
//!
//! Supports: Bearer and the Zoho OAuth2 refresh-token flow, plus the
//! one-time authorization-code exchange used to complete an OAuth flow.
//!
//! The `Authenticator` manages token caching for the refresh flow and
//! renews the access token transparently when it expires.

mod authenticator;
mod oauth;
mod types;

pub use authenticator::Authenticator;
pub use oauth::{authorization_url, exchange_code, token_url, AUTHORIZE_PATH, TOKEN_PATH};
pub use types::{AuthConfig, CachedToken, OAuthState};
