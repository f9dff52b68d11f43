//! Subscribable topics and their stream keys

use crate::enums::{Interval, TopicFamily};
use crate::symbol::CurrencyPair;
use std::fmt;

/// Prefix shared by all public kline stream keys
pub const KLINE_PREFIX: &str = "spot@public.kline.v3.api";

/// Stream key of the private order stream
pub const ORDERS_KEY: &str = "spot@private.orders.v3.api";

/// A stream the client can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Kline (OHLC) candles for a pair at an interval
    Kline {
        /// Traded pair
        pair: CurrencyPair,
        /// Candle interval
        interval: Interval,
    },
    /// Private order updates for the account owning the listen key
    Orders,
}

impl Topic {
    /// Create a kline topic
    pub fn kline(pair: CurrencyPair, interval: Interval) -> Self {
        Self::Kline { pair, interval }
    }

    /// Stream key identifying this topic on the wire
    ///
    /// Deterministic: the same topic always yields the same key, across
    /// reconnects and process restarts.
    pub fn key(&self) -> String {
        match self {
            Self::Kline { pair, interval } => {
                format!("{}@{}@{}", KLINE_PREFIX, pair.symbol(), interval.code())
            }
            Self::Orders => ORDERS_KEY.to_string(),
        }
    }

    /// The family whose decoder handles pushes for this topic
    pub fn family(&self) -> TopicFamily {
        match self {
            Self::Kline { .. } => TopicFamily::Kline,
            Self::Orders => TopicFamily::Orders,
        }
    }

    /// Returns true if the topic needs an authenticated (listen key) connection
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Orders)
    }

    /// Recover a topic from its stream key
    pub fn from_key(key: &str) -> Option<Self> {
        if key == ORDERS_KEY {
            return Some(Self::Orders);
        }

        let rest = key.strip_prefix(KLINE_PREFIX)?.strip_prefix('@')?;
        let (symbol, code) = rest.split_once('@')?;
        let pair = CurrencyPair::from_symbol(symbol).ok()?;
        let interval = Interval::from_code(code)?;
        Some(Self::Kline { pair, interval })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
