//! Schema discovery
//!
//! One schema per module whose field metadata can be fetched. Field
//! lookups run concurrently; a module that fails is left out and does not
//! affect the others.

use super::types::{
    DataFlowDirection, DiscoverMode, LookupMeta, Property, PropertyType, PublisherMeta, Schema,
};
use crate::error::Result;
use crate::zoho::{Field, Module, ZohoClient};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, error, info};

const CREATED_TIME: &str = "Created_Time";
const MODIFIED_TIME: &str = "Modified_Time";
const TEXT_THRESHOLD: i64 = 1024;

/// Discover schemas, optionally restricted to a previously known subset
///
/// Fails only when the module list itself cannot be fetched. In refresh
/// mode, requested schemas that are no longer discoverable are dropped.
pub async fn discover_schemas(
    client: &ZohoClient,
    mode: DiscoverMode,
    to_refresh: &[Schema],
) -> Result<Vec<Schema>> {
    debug!("Getting modules...");
    let modules = client.list_modules().await.map_err(|e| {
        error!("Failed to list modules: {e}");
        e
    })?;
    info!("Schemas attempted: {}", modules.len());

    let schemas: Vec<Schema> = join_all(
        modules
            .iter()
            .map(|module| schema_for_module(client, module)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    info!("Schemas returned: {}", schemas.len());

    match mode {
        DiscoverMode::All => Ok(schemas),
        DiscoverMode::Refresh => Ok(filter_refresh(schemas, to_refresh)),
    }
}

/// Inner join of discovered schemas with the requested ids
pub fn filter_refresh(discovered: Vec<Schema>, to_refresh: &[Schema]) -> Vec<Schema> {
    let wanted: HashSet<&str> = to_refresh.iter().map(|s| s.id.as_str()).collect();
    let found: Vec<Schema> = discovered
        .into_iter()
        .filter(|schema| wanted.contains(schema.id.as_str()))
        .collect();

    if found.len() < wanted.len() {
        debug!(
            "{} of {} requested schemas were not discoverable",
            wanted.len() - found.len(),
            wanted.len()
        );
    }
    found
}

async fn schema_for_module(client: &ZohoClient, module: &Module) -> Option<Schema> {
    debug!("Getting fields for: {}", module.module_name);

    match client.module_fields(&module.api_name).await {
        Ok(Some(fields)) => {
            debug!("Got fields for: {}", module.module_name);
            Some(build_schema(module, &fields))
        }
        Ok(None) => None,
        Err(e) => {
            error!("Failed to get fields for {}: {e}", module.module_name);
            None
        }
    }
}

/// Assemble the schema of a module from its field descriptors
pub fn build_schema(module: &Module, fields: &[Field]) -> Schema {
    let meta = PublisherMeta {
        module: Some(module.api_name.clone()),
    };

    let mut properties = Vec::with_capacity(fields.len() + 1);
    properties.push(key_property());
    properties.extend(fields.iter().map(property_for_field));

    Schema {
        id: module.api_name.clone(),
        name: module.api_name.clone(),
        description: module.module_name.clone(),
        data_flow_direction: DataFlowDirection::ReadWrite,
        properties,
        publisher_meta_json: serde_json::to_string(&meta).unwrap_or_default(),
    }
}

/// Record id, present on every module
fn key_property() -> Property {
    Property {
        id: "id".to_string(),
        name: "id".to_string(),
        property_type: PropertyType::String,
        is_key: true,
        type_at_source: "id".to_string(),
        is_nullable: false,
        ..Default::default()
    }
}

fn property_for_field(field: &Field) -> Property {
    let mut property = Property {
        id: field.api_name.clone(),
        name: field.field_label.clone(),
        property_type: property_type_for(field),
        is_create_counter: field.api_name == CREATED_TIME,
        is_update_counter: field.api_name == MODIFIED_TIME,
        type_at_source: field.data_type.clone(),
        is_nullable: true,
        ..Default::default()
    };

    // Lookups are written back by id, so expose them as strings
    if property.property_type == PropertyType::Json && field.data_type == "lookup" {
        property.property_type = PropertyType::String;
        property.publisher_meta_json =
            serde_json::to_string(&LookupMeta { is_lookup: true }).unwrap_or_default();
    }

    property
}

/// Map a Zoho field descriptor onto a property type
pub fn property_type_for(field: &Field) -> PropertyType {
    match field.json_type.as_deref() {
        Some("boolean") => PropertyType::Bool,
        Some("double") => PropertyType::Float,
        Some("integer") => PropertyType::Integer,
        Some("jsonarray" | "jsonobject") => PropertyType::Json,
        Some("string") => {
            if field.data_type == "datetime" {
                PropertyType::Datetime
            } else if field.length.unwrap_or(0) > TEXT_THRESHOLD {
                PropertyType::Text
            } else {
                PropertyType::String
            }
        }
        _ if field.data_type == "userlookup" => PropertyType::Json,
        _ => PropertyType::String,
    }
}
