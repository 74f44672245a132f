//! Publisher service
//!
//! The `Publisher` trait is the fixed contract the agent talks to.
//! `ZohoPublisher` implements it over one shared `Session`.

use super::types::{
    BeginOAuthFlowRequest, BeginOAuthFlowResponse, CompleteOAuthFlowRequest,
    CompleteOAuthFlowResponse, ConnectRequest, ConnectResponse, DisconnectResponse,
    DiscoverSchemasRequest, DiscoverSchemasResponse, PrepareWriteRequest, PrepareWriteResponse,
    ReadRequest,
};
use crate::auth::{authorization_url, exchange_code, OAuthState};
use crate::config::PluginConfig;
use crate::engine::{read_records, write_records, AckStream, RecordStream};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::record::Record;
use crate::schema::discover_schemas;
use crate::session::{FormSettings, Session, Settings, WriteSettings};
use crate::zoho::ZohoClient;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// ConnectSession output: one response, then open until Disconnect
pub type ConnectSessionStream = Pin<Box<dyn Stream<Item = ConnectResponse> + Send>>;

/// Service contract between the agent and a publisher plugin
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Build the consent URL; no network call
    async fn begin_oauth_flow(&self, request: BeginOAuthFlowRequest)
        -> Result<BeginOAuthFlowResponse>;

    /// Exchange the authorization code for an OAuth state blob
    async fn complete_oauth_flow(
        &self,
        request: CompleteOAuthFlowRequest,
    ) -> Result<CompleteOAuthFlowResponse>;

    /// Connect; failures are reported in the response, never as an error
    async fn connect(&self, request: ConnectRequest) -> ConnectResponse;

    /// Connect and hold the stream open until Disconnect
    async fn connect_session(&self, request: ConnectRequest) -> ConnectSessionStream;

    async fn discover_schemas(
        &self,
        request: DiscoverSchemasRequest,
    ) -> Result<DiscoverSchemasResponse>;

    async fn read_stream(&self, request: ReadRequest) -> Result<RecordStream>;

    async fn prepare_write(&self, request: PrepareWriteRequest) -> Result<PrepareWriteResponse>;

    /// Write records; one ack per record, in order
    async fn write_stream(&self, records: BoxStream<'static, Result<Record>>)
        -> Result<AckStream>;

    /// Always succeeds
    async fn disconnect(&self) -> DisconnectResponse;
}

/// Zoho CRM implementation of the publisher contract
pub struct ZohoPublisher {
    config: PluginConfig,
    session: Arc<Session>,
    client: RwLock<Option<Arc<ZohoClient>>>,
    oauth_client: reqwest::Client,
}

impl ZohoPublisher {
    /// Create a disconnected publisher
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            session: Session::new(),
            client: RwLock::new(None),
            oauth_client: reqwest::Client::new(),
        }
    }

    /// Shared session state
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Plugin configuration
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn build_client(&self, settings: &Settings) -> Result<ZohoClient> {
        let http = HttpClient::with_auth(
            self.config.http_client_config(),
            settings.auth_config(self.config.token_url()),
        )?;
        Ok(ZohoClient::new(http, &self.config.api_base_url))
    }

    async fn connected_client(&self) -> Result<Arc<ZohoClient>> {
        if !self.session.is_connected() {
            return Err(Error::NotConnected);
        }
        self.client.read().await.clone().ok_or(Error::NotConnected)
    }

    async fn try_connect(&self, request: &ConnectRequest, response: &mut ConnectResponse) {
        let oauth_state = if request.oauth_state_json.trim().is_empty() {
            OAuthState::default()
        } else {
            match serde_json::from_str::<OAuthState>(&request.oauth_state_json) {
                Ok(state) => state,
                Err(e) => {
                    error!("Invalid OAuth state: {e}");
                    response.oauth_error = e.to_string();
                    return;
                }
            }
        };

        let form = match FormSettings::from_json(&request.settings_json) {
            Ok(form) => form,
            Err(e) => {
                error!("Invalid settings: {e}");
                response.settings_error = e.to_string();
                return;
            }
        };

        let settings = Settings::merge(
            form,
            &request.oauth_configuration.client_id,
            &request.oauth_configuration.client_secret,
            &oauth_state.refresh_token,
        );
        if let Err(e) = settings.validate() {
            error!("Invalid settings: {e}");
            response.settings_error = e.to_string();
            return;
        }

        let client = match self.build_client(&settings) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build client: {e}");
                response.connection_error = e.to_string();
                return;
            }
        };

        if let Err(e) = client.check_access().await {
            error!("Connection check failed: {e}");
            response.connection_error = e.to_string();
            return;
        }

        *self.client.write().await = Some(Arc::new(client));
        self.session.connected(settings).await;
        info!("Connected to Zoho");
    }
}

#[async_trait]
impl Publisher for ZohoPublisher {
    async fn begin_oauth_flow(
        &self,
        request: BeginOAuthFlowRequest,
    ) -> Result<BeginOAuthFlowResponse> {
        info!("Begin OAuth flow");
        let authorization_url = authorization_url(
            &self.config.accounts_base_url,
            &request.configuration.client_id,
            &request.redirect_url,
            &self.config.scopes,
        )?;
        Ok(BeginOAuthFlowResponse { authorization_url })
    }

    async fn complete_oauth_flow(
        &self,
        request: CompleteOAuthFlowRequest,
    ) -> Result<CompleteOAuthFlowResponse> {
        info!("Complete OAuth flow");
        let state = exchange_code(
            &self.oauth_client,
            &self.config.accounts_base_url,
            &request.configuration.client_id,
            &request.configuration.client_secret,
            &request.redirect_url,
        )
        .await
        .map_err(|e| {
            error!("OAuth flow failed: {e}");
            e
        })?;

        Ok(CompleteOAuthFlowResponse {
            oauth_state_json: serde_json::to_string(&state)?,
        })
    }

    async fn connect(&self, request: ConnectRequest) -> ConnectResponse {
        info!("Connecting...");
        self.session.begin_connect().await;
        *self.client.write().await = None;

        let mut response = ConnectResponse {
            oauth_state_json: request.oauth_state_json.clone(),
            ..Default::default()
        };
        self.try_connect(&request, &mut response).await;
        response
    }

    async fn connect_session(&self, request: ConnectRequest) -> ConnectSessionStream {
        info!("Connecting session...");
        // Armed first so a Disconnect racing the connect still releases it
        let released = self.session.arm_session_wait().await;
        let response = self.connect(request).await;

        let first = stream::once(async move { response });
        let hold = stream::once(async move {
            let _ = released.await;
            info!("Session ended");
        })
        .filter_map(|()| async { None::<ConnectResponse> });

        Box::pin(first.chain(hold))
    }

    async fn discover_schemas(
        &self,
        request: DiscoverSchemasRequest,
    ) -> Result<DiscoverSchemasResponse> {
        info!("Discovering schemas...");
        let client = self.connected_client().await?;
        let schemas = discover_schemas(&client, request.mode, &request.to_refresh).await?;
        Ok(DiscoverSchemasResponse { schemas })
    }

    async fn read_stream(&self, request: ReadRequest) -> Result<RecordStream> {
        let client = self.connected_client().await?;
        let limit = (request.limit > 0).then(|| u64::from(request.limit));
        Ok(read_records(
            client,
            self.session.clone(),
            request.schema,
            limit,
            &request.job_id,
        ))
    }

    async fn prepare_write(&self, request: PrepareWriteRequest) -> Result<PrepareWriteResponse> {
        if !self.session.is_connected() {
            return Err(Error::NotConnected);
        }
        info!(job_id = %request.job_id, "Preparing write for schema: {}", request.schema.name);

        self.session
            .prepare_write(WriteSettings {
                commit_sla_seconds: request.commit_sla_seconds,
                schema: request.schema,
                job_id: request.job_id,
            })
            .await;
        Ok(PrepareWriteResponse {})
    }

    async fn write_stream(
        &self,
        records: BoxStream<'static, Result<Record>>,
    ) -> Result<AckStream> {
        let client = self.connected_client().await?;
        let settings = self.session.settings().await.ok_or(Error::NotConnected)?;
        let write = self
            .session
            .write_settings()
            .await
            .ok_or(Error::WriteNotConfigured)?;

        info!(job_id = %write.job_id, "Writing records");
        let job_id = write.job_id.clone();
        Ok(write_records(
            client,
            self.session.clone(),
            settings,
            write,
            records,
            &job_id,
        ))
    }

    async fn disconnect(&self) -> DisconnectResponse {
        self.session.disconnect().await;
        *self.client.write().await = None;
        info!("Disconnected");
        DisconnectResponse {}
    }
}
