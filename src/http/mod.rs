//! HTTP client module
//!
//! Authenticated requests against the Zoho API with retry, backoff and
//! optional client-side rate limiting.
//!
//! # Features
//!
//! - **Bearer tokens**: Every request goes through the `Authenticator`
//! - **Raw responses**: Status interpretation is left to the caller
//! - **Retries**: 429, gateway errors and transport failures only
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{
    is_success_and_not_empty, status_error, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
    RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
