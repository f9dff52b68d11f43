//! Per-subscription event handlers
//!
//! A handler is tagged with its topic family, which selects the decode path
//! for push frames. Callbacks are reference counted so the router can clone
//! a handler out of the registry and invoke it without holding any lock.

use mexc_types::mapper::{decode_kline, decode_order};
use mexc_types::{CurrencyPair, Interval, MexcResult, Ohlc, Order, Topic, TopicFamily};
use std::fmt;
use std::sync::Arc;

/// Callback for kline updates
pub type KlineCallback = Arc<dyn Fn(Ohlc) + Send + Sync>;
/// Callback for private order updates
pub type OrderCallback = Arc<dyn Fn(Order) + Send + Sync>;

/// Topic-family tagged callback
#[derive(Clone)]
pub enum EventHandler {
    /// Kline stream for one pair and interval
    Kline {
        pair: CurrencyPair,
        interval: Interval,
        callback: KlineCallback,
    },
    /// Private order stream
    Orders { callback: OrderCallback },
}

impl EventHandler {
    /// Handler for a kline stream
    pub fn kline<F>(pair: CurrencyPair, interval: Interval, f: F) -> Self
    where
        F: Fn(Ohlc) + Send + Sync + 'static,
    {
        Self::Kline {
            pair,
            interval,
            callback: Arc::new(f),
        }
    }

    /// Handler for the private order stream
    pub fn orders<F>(f: F) -> Self
    where
        F: Fn(Order) + Send + Sync + 'static,
    {
        Self::Orders {
            callback: Arc::new(f),
        }
    }

    /// Topic this handler consumes
    pub fn topic(&self) -> Topic {
        match self {
            Self::Kline { pair, interval, .. } => Topic::kline(pair.clone(), *interval),
            Self::Orders { .. } => Topic::Orders,
        }
    }

    /// Topic family selecting the decode path
    pub fn family(&self) -> TopicFamily {
        match self {
            Self::Kline { .. } => TopicFamily::Kline,
            Self::Orders { .. } => TopicFamily::Orders,
        }
    }

    /// Decode a push envelope and invoke the callback
    ///
    /// The callback is not invoked when decoding fails.
    pub fn dispatch(&self, envelope: &serde_json::Value) -> MexcResult<()> {
        match self {
            Self::Kline {
                pair,
                interval,
                callback,
            } => {
                let ohlc = decode_kline(envelope, pair, *interval)?;
                callback(ohlc);
            }
            Self::Orders { callback } => {
                let order = decode_order(envelope)?;
                callback(order);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kline { pair, interval, .. } => f
                .debug_struct("Kline")
                .field("pair", pair)
                .field("interval", interval)
                .finish_non_exhaustive(),
            Self::Orders { .. } => f.debug_struct("Orders").finish_non_exhaustive(),
        }
    }
}
