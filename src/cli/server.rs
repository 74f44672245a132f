//! HTTP transport for the publisher service
//!
//! Unary calls take and return JSON; the read, write and connect-session
//! calls stream newline-delimited JSON.

use super::ndjson;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::service::{
    BeginOAuthFlowRequest, BeginOAuthFlowResponse, CompleteOAuthFlowRequest,
    CompleteOAuthFlowResponse, ConnectRequest, ConnectResponse, DisconnectResponse,
    DiscoverSchemasRequest, DiscoverSchemasResponse, PrepareWriteRequest, PrepareWriteResponse,
    Publisher, ReadRequest,
};
use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Handshake protocol versions: core protocol, then app protocol
const CORE_PROTOCOL_VERSION: u32 = 1;
const APP_PROTOCOL_VERSION: u32 = 1;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn Publisher>,
}

// ============================================================================
// Error Responses
// ============================================================================

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotConnected | Error::WriteNotConfigured => StatusCode::PRECONDITION_FAILED,
        Error::Config { .. }
        | Error::MissingConfigField { .. }
        | Error::InvalidConfigValue { .. }
        | Error::JsonParse(_)
        | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        e if e.is_auth() => StatusCode::UNAUTHORIZED,
        Error::Http(_) | Error::HttpStatus { .. } | Error::Timeout { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {self}");
        (status_for(&self), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the router over a publisher
pub fn router(publisher: Arc<dyn Publisher>) -> Router {
    let state = AppState { publisher };

    Router::new()
        .route("/health", get(health))
        .route("/publisher/begin-oauth-flow", post(begin_oauth_flow))
        .route("/publisher/complete-oauth-flow", post(complete_oauth_flow))
        .route("/publisher/connect", post(connect))
        .route("/publisher/connect-session", post(connect_session))
        .route("/publisher/discover-schemas", post(discover_schemas))
        .route("/publisher/read-stream", post(read_stream))
        .route("/publisher/prepare-write", post(prepare_write))
        .route("/publisher/write-stream", post(write_stream))
        .route("/publisher/disconnect", post(disconnect))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Line the agent reads from stdout to find the plugin
pub fn handshake_line(addr: SocketAddr) -> String {
    format!("{CORE_PROTOCOL_VERSION}|{APP_PROTOCOL_VERSION}|tcp|{addr}|http")
}

/// Bind the listener
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Serving publisher on http://{addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn begin_oauth_flow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BeginOAuthFlowRequest>,
) -> Result<Json<BeginOAuthFlowResponse>> {
    state.publisher.begin_oauth_flow(request).await.map(Json)
}

async fn complete_oauth_flow(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompleteOAuthFlowRequest>,
) -> Result<Json<CompleteOAuthFlowResponse>> {
    state.publisher.complete_oauth_flow(request).await.map(Json)
}

async fn connect(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectRequest>,
) -> Json<ConnectResponse> {
    Json(state.publisher.connect(request).await)
}

async fn connect_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectRequest>,
) -> Response {
    let responses = state.publisher.connect_session(request).await.map(Ok);
    ndjson::response(ndjson::encode_stream(responses))
}

async fn discover_schemas(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DiscoverSchemasRequest>,
) -> Result<Json<DiscoverSchemasResponse>> {
    state.publisher.discover_schemas(request).await.map(Json)
}

async fn read_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReadRequest>,
) -> Result<Response> {
    let records = state.publisher.read_stream(request).await?;
    Ok(ndjson::response(ndjson::encode_stream(records)))
}

async fn prepare_write(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PrepareWriteRequest>,
) -> Result<Json<PrepareWriteResponse>> {
    state.publisher.prepare_write(request).await.map(Json)
}

async fn write_stream(State(state): State<Arc<AppState>>, body: Body) -> Result<Response> {
    let records = ndjson::decode_lines::<Record>(body);
    let acks = state.publisher.write_stream(records).await?;
    Ok(ndjson::response(ndjson::encode_stream(acks)))
}

async fn disconnect(State(state): State<Arc<AppState>>) -> Json<DisconnectResponse> {
    Json(state.publisher.disconnect().await)
}
