//! Shared session state
//!
//! One `Session` per process. Connect, PrepareWrite and Disconnect are the
//! only writers; the pipelines read the connected flag at every iteration
//! and may wait on its transition to `false`.

use super::types::{Settings, WriteSettings};
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Mutex, RwLock};
use tracing::debug;

#[derive(Debug, Default)]
struct ServerStatus {
    settings: Option<Settings>,
    write: Option<WriteSettings>,
}

/// Connection state shared by every call
#[derive(Debug)]
pub struct Session {
    status: RwLock<ServerStatus>,
    connected: watch::Sender<bool>,
    /// Pending ConnectSession call, released on Disconnect
    session_wait: Mutex<Option<oneshot::Sender<()>>>,
}

impl Default for Session {
    fn default() -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            status: RwLock::new(ServerStatus::default()),
            connected,
            session_wait: Mutex::new(None),
        }
    }
}

impl Session {
    /// Create a disconnected session
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether the session is currently connected
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Receiver following the connected flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    /// Drop any previous connection before a new Connect attempt
    pub async fn begin_connect(&self) {
        let mut status = self.status.write().await;
        self.connected.send_replace(false);
        *status = ServerStatus::default();
    }

    /// Install validated settings and mark the session connected
    pub async fn connected(&self, settings: Settings) {
        let mut status = self.status.write().await;
        status.settings = Some(settings);
        status.write = None;
        self.connected.send_replace(true);
    }

    /// Settings of the current connection
    pub async fn settings(&self) -> Option<Settings> {
        self.status.read().await.settings.clone()
    }

    /// Install write configuration
    pub async fn prepare_write(&self, write: WriteSettings) {
        self.status.write().await.write = Some(write);
    }

    /// Current write configuration, if PrepareWrite has run
    pub async fn write_settings(&self) -> Option<WriteSettings> {
        self.status.read().await.write.clone()
    }

    /// Whether reads and writes may proceed: connected and write-ready
    pub async fn is_write_configured(&self) -> bool {
        self.is_connected() && self.status.read().await.write.is_some()
    }

    /// Clear everything and release a pending session wait
    ///
    /// Safe to call in any state.
    pub async fn disconnect(&self) {
        {
            let mut status = self.status.write().await;
            self.connected.send_replace(false);
            *status = ServerStatus::default();
        }

        if let Some(waiter) = self.session_wait.lock().await.take() {
            debug!("Releasing pending session");
            let _ = waiter.send(());
        }
    }

    /// Arm the single-slot session wait
    ///
    /// A previously armed wait is resolved first.
    pub async fn arm_session_wait(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if let Some(previous) = self.session_wait.lock().await.replace(tx) {
            debug!("Replacing pending session");
            let _ = previous.send(());
        }
        rx
    }
}
