//! Log sink setup
//!
//! Stdout carries the handshake line, so log output goes to stderr or to an
//! append-mode file. `RUST_LOG` takes precedence over the CLI level.

use crate::error::{Error, Result};
use crate::types::LogLevel;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Build the level filter, preferring `RUST_LOG` when it is set
pub fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from(level).into()))
}

/// Install the global subscriber
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<()> {
    let filter = env_filter(level);

    let layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::config(format!(
                        "Failed to open log file '{}': {e}",
                        path.display()
                    ))
                })?;
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter)
                .boxed()
        }
        None => fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    };

    Registry::default()
        .with(layer)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialise logging: {e}")))
}
