//! Schema module
//!
//! Types describing modules to the agent, and discovery of those types
//! from Zoho field metadata.

mod discovery;
mod types;

pub use discovery::{build_schema, discover_schemas, filter_refresh, property_type_for};
pub use types::{
    DataFlowDirection, DiscoverMode, LookupMeta, Property, PropertyType, PublisherMeta, Schema,
};

#[cfg(test)]
mod tests;
