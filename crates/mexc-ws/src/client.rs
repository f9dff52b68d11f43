//! Stream client combining a connection with the subscription manager

use crate::connection::{Connection, ConnectionConfig, ConnectionState};
use crate::correlator::RequestId;
use crate::handler::EventHandler;
use crate::hooks::Hooks;
use crate::manager::SubscriptionManager;
use crate::registry::{SubscriptionSnapshot, SubscriptionState};
use crate::transport::Transport;
use mexc_types::{MexcError, MexcResult, Topic};
use std::sync::Arc;
use tracing::info;

/// Subscription client for one MEXC stream endpoint
///
/// The connection is opened lazily by the first `subscribe` (or explicitly by
/// `connect`). Dropping the client shuts the connection down.
pub struct StreamClient {
    connection: Connection,
    manager: Arc<SubscriptionManager<Connection>>,
}

impl StreamClient {
    /// Create a client using the tokio-tungstenite transport
    pub fn new(config: ConnectionConfig, hooks: Hooks) -> Self {
        let close_when_idle = config.close_when_idle;
        let connection = Connection::websocket(config, hooks.clone());
        Self::from_connection(connection, hooks, close_when_idle)
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: ConnectionConfig, transport: Box<dyn Transport>, hooks: Hooks) -> Self {
        let close_when_idle = config.close_when_idle;
        let connection = Connection::new(config, transport, hooks.clone());
        Self::from_connection(connection, hooks, close_when_idle)
    }

    fn from_connection(connection: Connection, hooks: Hooks, close_when_idle: bool) -> Self {
        let manager = Arc::new(SubscriptionManager::new(connection.clone(), hooks, close_when_idle));
        Self { connection, manager }
    }

    /// Open the connection and wait until it is ready
    pub async fn connect(&self) -> MexcResult<()> {
        self.ensure_open()?;
        if self.connection.wait_connected().await {
            Ok(())
        } else {
            Err(MexcError::ConnectionTimeout {
                url: self.connection.endpoint().to_string(),
                timeout: self.connection.connect_timeout(),
            })
        }
    }

    /// Subscribe a handler to its topic
    ///
    /// Waits, bounded by the connect timeout, until the connection is open.
    /// The returned id is the one the server's acknowledgement must carry.
    pub async fn subscribe(&self, handler: EventHandler) -> MexcResult<RequestId> {
        self.ensure_open()?;
        let id = self.manager.subscribe(handler)?;
        self.connection.wait_connected().await;
        Ok(id)
    }

    /// Unsubscribe from a topic
    ///
    /// Unknown topics are a no-op and return `Ok(None)`.
    pub async fn unsubscribe(&self, topic: &Topic) -> MexcResult<Option<RequestId>> {
        let id = self.manager.unsubscribe(topic)?;
        if id.is_some() {
            self.ensure_open()?;
            self.connection.wait_connected().await;
        }
        Ok(id)
    }

    /// State of a topic, if registered
    pub fn subscription_state(&self, topic: &Topic) -> Option<SubscriptionState> {
        self.manager.state(topic)
    }

    /// Snapshot of every registered topic
    pub fn subscriptions(&self) -> Vec<SubscriptionSnapshot> {
        self.manager.subscriptions()
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Unsubscribe every topic, then shut the connection down
    pub async fn close(&self) {
        if self.connection.is_shutdown() {
            return;
        }
        let queued = self.manager.unsubscribe_all();
        info!(unsubscribed = queued, "Closing client");
        self.connection.close().await;
    }

    fn ensure_open(&self) -> MexcResult<()> {
        if self.connection.is_shutdown() {
            return Err(MexcError::ShuttingDown);
        }
        self.connection.open(self.manager.clone());
        Ok(())
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.connection.shutdown();
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("connection", &self.connection)
            .field("subscriptions", &self.manager.registry().len())
            .finish()
    }
}
