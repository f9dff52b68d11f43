//! Interval, Method, and order enums

use crate::error::MexcError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Control command methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Subscribe to one or more topics
    Subscription,
    /// Unsubscribe from one or more topics
    Unsubscription,
    /// Application-level keep-alive
    Ping,
}

impl Method {
    /// Returns the method name as used in API messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "SUBSCRIPTION",
            Self::Unsubscription => "UNSUBSCRIPTION",
            Self::Ping => "PING",
        }
    }
}

/// Kline interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    Min1,
    /// 5 minutes
    Min5,
    /// 15 minutes
    Min15,
    /// 30 minutes
    Min30,
    /// 1 hour
    Min60,
    /// 4 hours
    Hour4,
    /// 8 hours
    Hour8,
    /// 1 day
    Day1,
    /// 1 week
    Week1,
    /// 1 month
    #[serde(rename = "M1")]
    Month1,
}

impl Interval {
    /// All supported intervals, shortest first
    pub const ALL: [Interval; 10] = [
        Self::Min1,
        Self::Min5,
        Self::Min15,
        Self::Min30,
        Self::Min60,
        Self::Hour4,
        Self::Hour8,
        Self::Day1,
        Self::Week1,
        Self::Month1,
    ];

    /// Returns the interval code used in topic keys
    pub fn code(&self) -> &'static str {
        match self {
            Self::Min1 => "Min1",
            Self::Min5 => "Min5",
            Self::Min15 => "Min15",
            Self::Min30 => "Min30",
            Self::Min60 => "Min60",
            Self::Hour4 => "Hour4",
            Self::Hour8 => "Hour8",
            Self::Day1 => "Day1",
            Self::Week1 => "Week1",
            Self::Month1 => "M1",
        }
    }

    /// Parse an interval code (e.g. "Min15")
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.code() == code)
    }

    /// Interval length in seconds (a month counts as 30 days)
    pub fn as_secs(&self) -> u64 {
        match self {
            Self::Min1 => 60,
            Self::Min5 => 5 * 60,
            Self::Min15 => 15 * 60,
            Self::Min30 => 30 * 60,
            Self::Min60 => 60 * 60,
            Self::Hour4 => 4 * 60 * 60,
            Self::Hour8 => 8 * 60 * 60,
            Self::Day1 => 24 * 60 * 60,
            Self::Week1 => 7 * 24 * 60 * 60,
            Self::Month1 => 30 * 24 * 60 * 60,
        }
    }

    /// Interval length as a [`Duration`]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    /// Map a duration onto a supported interval
    pub fn from_duration(duration: Duration) -> Result<Self, MexcError> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_secs() == duration.as_secs() && duration.subsec_nanos() == 0)
            .ok_or_else(|| MexcError::UnsupportedInterval(format!("{:?}", duration)))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Topic families; each family has its own decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicFamily {
    /// Public kline (OHLC) stream
    Kline,
    /// Private order updates
    Orders,
}

impl TopicFamily {
    /// Returns the family name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kline => "kline",
            Self::Orders => "orders",
        }
    }
}

/// Buy or sell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderAction {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl OrderAction {
    /// Map the wire trade-type code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }
}

/// Order types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Limit order
    Limit,
    /// Post-only (maker) limit order
    PostOnly,
    /// Immediate-or-cancel
    ImmediateOrCancel,
    /// Fill-or-kill
    FillOrKill,
    /// Market order
    Market,
}

impl OrderType {
    /// Map the wire order-type code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Limit),
            2 => Some(Self::PostOnly),
            3 => Some(Self::ImmediateOrCancel),
            4 => Some(Self::FillOrKill),
            5 => Some(Self::Market),
            _ => None,
        }
    }
}

/// Order status as reported by the private order stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order accepted
    New,
    /// Completely filled
    Filled,
    /// Partially filled, still working
    PartiallyFilled,
    /// Canceled without fills
    Canceled,
    /// Partially filled, remainder canceled
    PartiallyCanceled,
}

impl OrderStatus {
    /// Map the wire status code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::New),
            2 => Some(Self::Filled),
            3 => Some(Self::PartiallyFilled),
            4 => Some(Self::Canceled),
            5 => Some(Self::PartiallyCanceled),
            _ => None,
        }
    }

    /// Check if order is terminal (no more changes)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::PartiallyCanceled)
    }
}
