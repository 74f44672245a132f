//! Publisher service
//!
//! Message types and the `Publisher` contract, independent of transport.

mod publisher;
mod types;

pub use publisher::{ConnectSessionStream, Publisher, ZohoPublisher};
pub use types::{
    BeginOAuthFlowRequest, BeginOAuthFlowResponse, CompleteOAuthFlowRequest,
    CompleteOAuthFlowResponse, ConnectRequest, ConnectResponse, DisconnectResponse,
    DiscoverSchemasRequest, DiscoverSchemasResponse, OAuthConfiguration, PrepareWriteRequest,
    PrepareWriteResponse, ReadRequest,
};
