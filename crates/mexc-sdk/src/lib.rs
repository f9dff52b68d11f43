//! High-level SDK for the MEXC spot streaming API
//!
//! This crate wraps the subscription manager in two clients: [`PublicClient`]
//! for kline streams and [`PrivateClient`] for account order updates. Both
//! open the connection lazily, repair it automatically and re-subscribe every
//! registered topic afterwards.
//!
//! # Quick Start
//!
//! ```no_run
//! use mexc_sdk::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PublicClient::builder()
//!         .with_timeout(Duration::from_secs(5))
//!         .build_public()?;
//!
//!     let pair = CurrencyPair::new("ETH", "USDT");
//!     client
//!         .subscribe_kline(pair, Interval::Min5, |ohlc| {
//!             println!("{}: o={} c={}", ohlc.pair, ohlc.open, ohlc.close);
//!         })
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod error;
pub mod prelude;
pub mod private;
pub mod public;

// Re-export main types
pub use builder::{ClientBuilder, ConfigError};
pub use error::ClientError;
pub use private::PrivateClient;
pub use public::PublicClient;

// Re-export commonly used types from dependencies
pub use mexc_auth::{AuthError, Credentials};
pub use mexc_types::{CurrencyPair, Interval, MexcError, Ohlc, Order};
pub use mexc_ws::{ConnectionState, Endpoint, Hooks, ReconnectConfig, SubscriptionState};
