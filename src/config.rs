//! Plugin configuration
//!
//! Deployment-level settings loaded from an optional YAML file. Everything
//! has a default pointing at the Zoho US data center, so the plugin runs
//! without a file at all.

use crate::auth::token_url;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Plugin Config
// ============================================================================

/// Complete plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Base URL of the CRM API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the accounts (OAuth) server
    #[serde(default = "default_accounts_base_url")]
    pub accounts_base_url: String,

    /// Scopes requested during the OAuth flow
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            accounts_base_url: default_accounts_base_url(),
            scopes: default_scopes(),
            http: HttpSettings::default(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://www.zohoapis.com/crm/v2".to_string()
}

fn default_accounts_base_url() -> String {
    "https://accounts.zoho.com".to_string()
}

fn default_scopes() -> Vec<String> {
    [
        "ZohoCRM.users.all",
        "ZohoCRM.org.all",
        "ZohoCRM.settings.all",
        "ZohoCRM.modules.all",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl PluginConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("accounts_base_url", &self.accounts_base_url),
        ] {
            url::Url::parse(value).map_err(|e| Error::InvalidConfigValue {
                field: field.to_string(),
                message: e.to_string(),
            })?;
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::InvalidConfigValue {
                field: "http.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Token endpoint of the accounts server
    pub fn token_url(&self) -> String {
        token_url(&self.accounts_base_url)
    }

    /// HTTP client settings for API calls
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_secs))
            .max_retries(self.http.max_retries);

        if let Some(rps) = self.http.rate_limit_rps {
            builder = builder.rate_limit(RateLimiterConfig::new(rps, rps));
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests per second, unlimited when unset
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            rate_limit_rps: None,
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.api_base_url, "https://www.zohoapis.com/crm/v2");
        assert_eq!(config.token_url(), "https://accounts.zoho.com/oauth/v2/token");
        assert_eq!(config.scopes.len(), 4);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
accounts_base_url: https://accounts.zoho.eu
http:
  rate_limit_rps: 5
";
        let config = PluginConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.accounts_base_url, "https://accounts.zoho.eu");
        assert_eq!(config.api_base_url, "https://www.zohoapis.com/crm/v2");
        assert_eq!(config.http.max_retries, 3);

        let http = config.http_client_config();
        assert!(http.rate_limit.is_some());
        assert_eq!(http.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PluginConfig::from_yaml("api_base_url: not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));

        let err = PluginConfig::from_yaml("http:\n  timeout_secs: 0").unwrap_err();
        assert!(err.to_string().contains("http.timeout_secs"));

        assert!(PluginConfig::from_yaml("scopes: 12").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scopes: [ZohoCRM.modules.all]").unwrap();

        let config = PluginConfig::load(file.path()).unwrap();
        assert_eq!(config.scopes, vec!["ZohoCRM.modules.all".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PluginConfig::load("/nonexistent/zoho.yaml").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
