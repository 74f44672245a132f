//! Schema types
//!
//! Shapes exchanged with the agent. Field names are camelCase on the wire
//! and enum values SCREAMING_SNAKE_CASE; the metadata blobs stored inside
//! them keep PascalCase member names.

use serde::{Deserialize, Serialize};

/// Generic property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    #[default]
    String,
    /// String longer than 1024 characters
    Text,
    Bool,
    Integer,
    Float,
    Json,
    Datetime,
}

/// Which ways data may flow for a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataFlowDirection {
    Read,
    Write,
    #[default]
    ReadWrite,
}

/// Discovery mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoverMode {
    /// Discover every module
    #[default]
    All,
    /// Rediscover only the requested schemas
    Refresh,
}

/// One field of a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub is_key: bool,
    pub is_create_counter: bool,
    pub is_update_counter: bool,
    pub type_at_source: String,
    pub is_nullable: bool,
    /// Serialized `LookupMeta` for lookup fields, empty otherwise
    pub publisher_meta_json: String,
}

impl Property {
    /// Whether the property references a record of another module
    pub fn is_lookup(&self) -> bool {
        serde_json::from_str::<LookupMeta>(&self.publisher_meta_json)
            .is_ok_and(|meta| meta.is_lookup)
    }
}

/// Description of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    pub id: String,
    pub name: String,
    pub description: String,
    pub data_flow_direction: DataFlowDirection,
    pub properties: Vec<Property>,
    /// Serialized `PublisherMeta`
    pub publisher_meta_json: String,
}

impl Schema {
    /// Module the schema is routed to
    ///
    /// Schemas stored before the routing blob existed only carry a name.
    pub fn module_name(&self) -> String {
        serde_json::from_str::<PublisherMeta>(&self.publisher_meta_json)
            .ok()
            .and_then(|meta| meta.module)
            .filter(|module| !module.is_empty())
            .unwrap_or_else(|| self.name.clone())
    }

    /// The property flagged as last-modified time
    pub fn update_counter(&self) -> Option<&Property> {
        self.properties.iter().find(|p| p.is_update_counter)
    }

    /// Find a property by id
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }
}

/// Routing blob stored in `Schema::publisher_meta_json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublisherMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// Lookup marker stored in `Property::publisher_meta_json`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LookupMeta {
    #[serde(default)]
    pub is_lookup: bool,
}
