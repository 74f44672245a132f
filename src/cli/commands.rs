//! CLI arguments

use crate::config::PluginConfig;
use crate::error::Result;
use crate::types::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Zoho CRM publisher plugin
#[derive(Parser, Debug)]
#[command(name = "zoho-crm-publisher")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Plugin configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(short, long, default_value_t = 0)]
    pub port: u16,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Override the CRM API base URL
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Override the accounts server base URL
    #[arg(long)]
    pub accounts_base_url: Option<String>,
}

impl Cli {
    /// Load the config file, if any, and apply command-line overrides
    pub fn resolve_config(&self) -> Result<PluginConfig> {
        let mut config = match &self.config {
            Some(path) => PluginConfig::load(path)?,
            None => PluginConfig::default(),
        };

        if let Some(url) = &self.api_base_url {
            config.api_base_url.clone_from(url);
        }
        if let Some(url) = &self.accounts_base_url {
            config.accounts_base_url.clone_from(url);
        }
        Ok(config)
    }

    /// Address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
