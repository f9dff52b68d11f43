//! Subscription lifecycle manager for the MEXC spot WebSocket API
//!
//! This crate keeps kline and private order subscriptions alive on a single
//! streaming connection: it correlates acknowledgements with the commands that
//! caused them, routes pushes to the right callback, and re-subscribes every
//! registered topic after the connection is repaired.
//!
//! # Features
//!
//! - Automatic reconnection on a fixed schedule with resubscription
//! - Per-topic state (`Init`, `Subscribed`, `SubscribeFailed`, `UnsubscribeFailed`)
//! - Stale acknowledgement detection by request id
//! - Application-level keep-alive and stale connection detection
//! - Lifecycle hooks for logging and metrics
//!
//! # Example
//!
//! ```no_run
//! use mexc_ws::{ConnectionConfig, EventHandler, Hooks, StreamClient};
//! use mexc_types::{CurrencyPair, Interval};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamClient::new(ConnectionConfig::new(), Hooks::new());
//!
//!     let pair = CurrencyPair::new("BTC", "USDT");
//!     client
//!         .subscribe(EventHandler::kline(pair, Interval::Min1, |ohlc| {
//!             println!("{} close={}", ohlc.pair, ohlc.close);
//!         }))
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod connection;
pub mod correlator;
pub mod endpoint;
pub mod events;
pub mod handler;
pub mod hooks;
pub mod manager;
pub mod reconnect;
pub mod registry;
pub mod router;
pub mod transport;

// Re-export main types
pub use client::StreamClient;
pub use connection::{Connection, ConnectionConfig, ConnectionListener, ConnectionState};
pub use correlator::{RequestId, RequestIds};
pub use endpoint::Endpoint;
pub use events::{ConnectInfo, DisconnectReason, SubscriptionEvent};
pub use handler::{EventHandler, KlineCallback, OrderCallback};
pub use hooks::Hooks;
pub use manager::{CommandSink, SubscriptionManager};
pub use reconnect::ReconnectConfig;
pub use registry::{Resolution, SubscriptionRegistry, SubscriptionSnapshot, SubscriptionState};
pub use router::{Routed, Router};
pub use transport::{Transport, TransportError, WsTransport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::{MockServer, MockTransport};
