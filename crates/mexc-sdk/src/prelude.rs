//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use mexc_sdk::prelude::*;
//! ```

// Clients
pub use crate::builder::{ClientBuilder, ConfigError};
pub use crate::error::ClientError;
pub use crate::private::PrivateClient;
pub use crate::public::PublicClient;

// Types from mexc-types
pub use mexc_types::{
    CurrencyPair, Interval, MexcError, MexcResult, Ohlc, Order, OrderAction, OrderStatus,
    OrderType, Topic,
};

// WebSocket types
pub use mexc_ws::{
    ConnectInfo, ConnectionState, DisconnectReason, Endpoint, Hooks, ReconnectConfig, RequestId,
    SubscriptionEvent, SubscriptionSnapshot, SubscriptionState,
};

// Auth types
pub use mexc_auth::{AuthError, Credentials, ListenKeyClient, ListenKeyStore};

// Decimal for prices/quantities
pub use rust_decimal::Decimal;
