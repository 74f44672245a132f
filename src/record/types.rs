//! Record envelopes exchanged with the agent

use serde::{Deserialize, Serialize};

/// What the agent should do with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordAction {
    #[default]
    Upsert,
}

/// One row, with its payload serialized as a JSON object keyed by property id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub action: RecordAction,
    pub correlation_id: String,
    pub data_json: String,
}

impl Record {
    /// An upsert carrying the given payload
    pub fn upsert(data_json: String) -> Self {
        Self {
            action: RecordAction::Upsert,
            correlation_id: String::new(),
            data_json,
        }
    }
}

/// Outcome of writing one record; an empty error means success
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordAck {
    pub correlation_id: String,
    pub error: String,
}

impl RecordAck {
    pub fn ok(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            error: String::new(),
        }
    }

    pub fn failed(correlation_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}
