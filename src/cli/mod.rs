//! Command-line entry and HTTP transport
//!
//! The binary binds a listener, prints the handshake line on stdout and
//! serves the publisher routes until the agent lets go of stdin.

mod commands;
mod ndjson;
mod server;

pub use commands::Cli;
pub use ndjson::{decode_lines, encode_stream, CONTENT_TYPE};
pub use server::{bind, handshake_line, router, serve, AppState};
