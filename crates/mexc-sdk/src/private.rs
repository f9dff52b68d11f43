//! Private order stream client

use crate::builder::ClientBuilder;
use crate::error::ClientError;
use mexc_auth::{Credentials, KeepAlive, ListenKeyClient};
use mexc_types::{MexcResult, Order, Topic};
use mexc_ws::{ConnectionState, EventHandler, RequestId, StreamClient, SubscriptionState};
use std::sync::Arc;
use tracing::{info, instrument};

/// Client for the private order stream
///
/// Connects to the listen-key URL and keeps the account's listen keys alive
/// for as long as the client exists.
///
/// # Example
///
/// ```no_run
/// use mexc_sdk::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PrivateClient::connect(Credentials::from_env()?).await?;
///
///     client
///         .subscribe_orders(|order| {
///             println!("{} {:?} {:?}", order.pair, order.action, order.status);
///         })
///         .await?;
///
///     tokio::signal::ctrl_c().await?;
///     client.close().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PrivateClient {
    stream: StreamClient,
    listen_key: String,
    keep_alive: KeepAlive,
}

impl PrivateClient {
    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect with default settings using the REST listen key API
    pub async fn connect(credentials: Credentials) -> Result<Self, ClientError> {
        let store = Arc::new(ListenKeyClient::new(credentials)?);
        ClientBuilder::new().build_private(store).await
    }

    pub(crate) fn new(stream: StreamClient, listen_key: String, keep_alive: KeepAlive) -> Self {
        Self {
            stream,
            listen_key,
            keep_alive,
        }
    }

    /// Subscribe to order updates
    ///
    /// Subscribing again replaces the callback.
    #[instrument(skip(self, callback))]
    pub async fn subscribe_orders<F>(&self, callback: F) -> MexcResult<RequestId>
    where
        F: Fn(Order) + Send + Sync + 'static,
    {
        self.stream.subscribe(EventHandler::orders(callback)).await
    }

    /// Unsubscribe from order updates
    pub async fn unsubscribe_orders(&self) -> MexcResult<Option<RequestId>> {
        self.stream.unsubscribe(&Topic::Orders).await
    }

    /// Subscription state of the order stream
    pub fn orders_state(&self) -> Option<SubscriptionState> {
        self.stream.subscription_state(&Topic::Orders)
    }

    /// Listen key authorising this connection
    pub fn listen_key(&self) -> &str {
        &self.listen_key
    }

    /// Get the connection state
    pub fn state(&self) -> ConnectionState {
        self.stream.connection_state()
    }

    /// Underlying stream client
    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }

    /// Unsubscribe, stop the keep-alive task and shut down
    pub async fn close(&self) {
        self.keep_alive.stop();
        self.stream.close().await;
        info!("Private client closed");
    }
}
