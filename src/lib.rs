//! # Zoho CRM Publisher
//!
//! A publisher plugin that lets a data-integration agent read from and write
//! back to Zoho CRM.
//!
//! ## Features
//!
//! - **OAuth**: Consent URL, code exchange and refresh-token renewal
//! - **Discovery**: One schema per CRM module, with typed properties
//! - **Reads**: Page-numbered streaming over a module's records
//! - **Write-back**: Per-record upserts with conflict detection and a
//!   commit deadline
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │               HTTP transport (/publisher/*)                  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │          Publisher: connect / discover / read / write        │
//! └──────┬──────────────┬───────────────┬───────────────┬────────┘
//!        │              │               │               │
//! ┌──────┴─────┐ ┌──────┴─────┐ ┌───────┴──────┐ ┌──────┴───────┐
//! │  Session   │ │   Schema   │ │   Engine     │ │   Record     │
//! │ state/wait │ │ discovery  │ │ read/write   │ │ mapping      │
//! └────────────┘ └────────────┘ └───────┬──────┘ └──────────────┘
//!                                       │
//!                ┌──────────────────────┴────────────────┐
//!                │  Zoho client → HTTP client → Auth     │
//!                │  retry, backoff, rate limit, tokens   │
//!                └───────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// OAuth and token management
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Page-number pagination
pub mod pagination;

/// Zoho CRM API client
pub mod zoho;

/// Schemas and discovery
pub mod schema;

/// Records, acks and value mapping
pub mod record;

/// Connection state shared by all calls
pub mod session;

/// Read and write pipelines
pub mod engine;

/// Plugin configuration
pub mod config;

/// Log sink setup
pub mod logging;

/// Publisher contract and implementation
pub mod service;

/// Command-line interface and HTTP transport
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use service::{Publisher, ZohoPublisher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
