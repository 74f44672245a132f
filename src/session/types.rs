//! Session settings types

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings form filled in by the user, as sent in `settingsJson`
///
/// Credentials are optional here; they usually come from the OAuth
/// configuration and state instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FormSettings {
    pub insert_only: bool,
    pub workflow_trigger: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

impl FormSettings {
    /// Parse the settings blob; an empty blob means defaults
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }
}

/// Effective settings of a connected session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub insert_only: bool,
    pub workflow_trigger: bool,
}

impl Settings {
    /// Merge the OAuth credentials with the form; OAuth values win when set
    pub fn merge(
        form: FormSettings,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Self {
        let pick = |preferred: &str, fallback: Option<String>| {
            preferred
                .to_string()
                .none_if_empty()
                .or(fallback.none_if_empty())
                .unwrap_or_default()
        };

        Self {
            client_id: pick(client_id, form.client_id),
            client_secret: pick(client_secret, form.client_secret),
            refresh_token: pick(refresh_token, form.refresh_token),
            insert_only: form.insert_only,
            workflow_trigger: form.workflow_trigger,
        }
    }

    /// Ensure every credential is present
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(Error::missing_field("ClientId"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::missing_field("ClientSecret"));
        }
        if self.refresh_token.is_empty() {
            return Err(Error::missing_field("RefreshToken"));
        }
        Ok(())
    }

    /// Refresh-token authentication against the given token endpoint
    pub fn auth_config(&self, token_url: impl Into<String>) -> AuthConfig {
        AuthConfig::Oauth2Refresh {
            token_url: token_url.into(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Write configuration installed by PrepareWrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSettings {
    /// Seconds each record may take; zero means no limit
    pub commit_sla_seconds: u32,
    /// Schema records are written against
    pub schema: Schema,
    /// Job the write belongs to, for log correlation
    pub job_id: String,
}

impl WriteSettings {
    /// Per-record deadline, if any
    pub fn commit_sla(&self) -> Option<Duration> {
        (self.commit_sla_seconds > 0).then(|| Duration::from_secs(u64::from(self.commit_sla_seconds)))
    }
}
