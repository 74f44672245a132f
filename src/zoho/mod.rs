//! Zoho CRM REST API
//!
//! Routing for the endpoints the publisher uses:
//!
//! - `GET settings/modules` and `GET settings/fields?module=M` for discovery
//! - `GET M?page=N` for reads
//! - `GET M/{id}` for the conflict check
//! - `POST M` and `POST M/upsert` for write-back

mod client;
mod types;

pub use client::ZohoClient;
pub use types::{
    Field, FieldsResponse, Module, ModulesResponse, PageInfo, RecordsResponse, UpsertObject,
    UpsertResponse, WriteEnvelope,
};

#[cfg(test)]
mod tests;
