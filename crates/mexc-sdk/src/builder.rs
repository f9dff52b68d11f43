//! Client Builder Pattern
//!
//! Provides a fluent builder API for configuring public and private clients
//! with sensible defaults and validation.
//!
//! # Example
//!
//! ```
//! use mexc_sdk::builder::ClientBuilder;
//! use std::time::Duration;
//!
//! let builder = ClientBuilder::new()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_close_when_idle(false);
//! assert!(builder.validate().is_ok());
//! ```

use crate::error::ClientError;
use crate::private::PrivateClient;
use crate::public::PublicClient;
use mexc_auth::{KeepAlive, ListenKeyStore, DEFAULT_KEEP_ALIVE_INTERVAL};
use mexc_ws::{ConnectionConfig, Endpoint, Hooks, ReconnectConfig, StreamClient, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Timeout too short
    #[error("connection timeout must be at least 1 second")]
    TimeoutTooShort,

    /// Ping interval not below the stale timeout
    #[error("ping interval ({ping:?}) must be shorter than the stale timeout ({stale:?})")]
    PingNotBelowStaleTimeout { ping: Duration, stale: Duration },

    /// Keep-alive period outside the listen key validity
    #[error("keep-alive interval must be between 1 second and 60 minutes")]
    InvalidKeepAlive,

    /// Private endpoint configured on a public client
    #[error("private endpoint requires a private client")]
    PrivateEndpointOnPublicClient,
}

/// Builder for public and private clients
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    /// Endpoint override (defaults to the public or listen-key URL)
    pub endpoint: Option<Endpoint>,

    /// Enable automatic reconnection
    pub reconnect: bool,

    /// Reconnection configuration
    pub reconnect_config: ReconnectConfig,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Keep-alive ping period
    pub ping_interval: Duration,

    /// Silence after which the connection is considered dead
    pub stale_timeout: Duration,

    /// Close the connection when the last topic is unsubscribed
    pub close_when_idle: bool,

    /// Listen key keep-alive period (private clients)
    pub keep_alive_interval: Duration,

    /// Lifecycle hooks
    pub hooks: Hooks,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        let defaults = ConnectionConfig::default();
        Self {
            endpoint: None,
            reconnect: true,
            reconnect_config: ReconnectConfig::default(),
            connect_timeout: defaults.connect_timeout,
            ping_interval: defaults.ping_interval,
            stale_timeout: defaults.stale_timeout,
            close_when_idle: defaults.close_when_idle,
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            hooks: Hooks::new(),
        }
    }
}

impl ClientBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the WebSocket endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Enable or disable automatic reconnection
    pub fn with_reconnect(mut self, enabled: bool) -> Self {
        self.reconnect = enabled;
        self
    }

    /// Disable automatic reconnection
    pub fn without_reconnect(mut self) -> Self {
        self.reconnect = false;
        self
    }

    /// Set the reconnection configuration
    pub fn with_reconnect_config(mut self, config: ReconnectConfig) -> Self {
        self.reconnect_config = config;
        self
    }

    /// Set the connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the keep-alive ping period
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set the stale connection timeout
    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_timeout = timeout;
        self
    }

    /// Close the connection once no topic is registered
    pub fn with_close_when_idle(mut self, enabled: bool) -> Self {
        self.close_when_idle = enabled;
        self
    }

    /// Set the listen key keep-alive period
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set lifecycle hooks
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout < Duration::from_secs(1) {
            return Err(ConfigError::TimeoutTooShort);
        }

        if self.ping_interval >= self.stale_timeout {
            return Err(ConfigError::PingNotBelowStaleTimeout {
                ping: self.ping_interval,
                stale: self.stale_timeout,
            });
        }

        if self.keep_alive_interval < Duration::from_secs(1)
            || self.keep_alive_interval > Duration::from_secs(60 * 60)
        {
            return Err(ConfigError::InvalidKeepAlive);
        }

        Ok(())
    }

    /// Convert to connection config for `endpoint`
    pub fn to_connection_config(&self, endpoint: Endpoint) -> ConnectionConfig {
        let config = ConnectionConfig::new()
            .with_endpoint(self.endpoint.clone().unwrap_or(endpoint))
            .with_timeout(self.connect_timeout)
            .with_ping_interval(self.ping_interval)
            .with_stale_timeout(self.stale_timeout)
            .with_close_when_idle(self.close_when_idle);

        if self.reconnect {
            config.with_reconnect(self.reconnect_config.clone())
        } else {
            config.without_reconnect()
        }
    }

    /// Build a public client
    pub fn build_public(self) -> Result<PublicClient, ConfigError> {
        let config = self.public_config()?;
        Ok(PublicClient::from_stream(StreamClient::new(config, self.hooks)))
    }

    /// Build a public client over a custom transport
    pub fn build_public_with(self, transport: Box<dyn Transport>) -> Result<PublicClient, ConfigError> {
        let config = self.public_config()?;
        Ok(PublicClient::from_stream(StreamClient::with_transport(
            config, transport, self.hooks,
        )))
    }

    /// Build a private client, obtaining a listen key from `store`
    ///
    /// Starts a keep-alive task extending the account's listen keys.
    pub async fn build_private<S>(self, store: Arc<S>) -> Result<PrivateClient, ClientError>
    where
        S: ListenKeyStore + 'static,
    {
        self.validate()?;
        let listen_key = store.active_listen_key().await?;
        let config = self.to_connection_config(Endpoint::private(listen_key.clone()));
        let stream = StreamClient::new(config, self.hooks.clone());
        Ok(self.finish_private(stream, listen_key, store))
    }

    /// Build a private client over a custom transport
    pub async fn build_private_with<S>(
        self,
        store: Arc<S>,
        transport: Box<dyn Transport>,
    ) -> Result<PrivateClient, ClientError>
    where
        S: ListenKeyStore + 'static,
    {
        self.validate()?;
        let listen_key = store.active_listen_key().await?;
        let config = self.to_connection_config(Endpoint::private(listen_key.clone()));
        let stream = StreamClient::with_transport(config, transport, self.hooks.clone());
        Ok(self.finish_private(stream, listen_key, store))
    }

    fn public_config(&self) -> Result<ConnectionConfig, ConfigError> {
        self.validate()?;
        if matches!(self.endpoint, Some(Endpoint::Private { .. })) {
            return Err(ConfigError::PrivateEndpointOnPublicClient);
        }
        Ok(self.to_connection_config(Endpoint::Public))
    }

    fn finish_private<S>(&self, stream: StreamClient, listen_key: String, store: Arc<S>) -> PrivateClient
    where
        S: ListenKeyStore + 'static,
    {
        let keep_alive = KeepAlive::spawn_every(store, self.keep_alive_interval);
        info!(endpoint = %stream.connection().endpoint(), "Private client created");
        PrivateClient::new(stream, listen_key, keep_alive)
    }
}
