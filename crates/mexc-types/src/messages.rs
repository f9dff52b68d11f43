//! Request and response message types for the MEXC spot WebSocket API

use crate::enums::Method;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Control command sent to the endpoint
///
/// Serializes as `{"id":1,"method":"SUBSCRIPTION","params":["<key>"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Request id echoed in the acknowledgement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    /// Command method
    pub method: Method,
    /// Topic keys
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl Command {
    /// Create a subscribe command for a single key
    pub fn subscribe(id: u32, key: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            method: Method::Subscription,
            params: vec![key.into()],
        }
    }

    /// Create an unsubscribe command for a single key
    pub fn unsubscribe(id: u32, key: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            method: Method::Unsubscription,
            params: vec![key.into()],
        }
    }

    /// Create a keep-alive ping
    pub fn ping() -> Self {
        Self {
            id: None,
            method: Method::Ping,
            params: Vec::new(),
        }
    }

    /// Serialize to the JSON text sent on the wire
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Acknowledgement of a control command
///
/// `msg` echoes the topic key for subscribe/unsubscribe acks and is `PONG`
/// for keep-alive replies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandAck {
    /// Request id of the acknowledged command
    #[serde(default)]
    pub id: u32,
    /// Result code; 0 means success
    pub code: i32,
    /// Echoed key or message text
    pub msg: String,
}

impl CommandAck {
    /// Message text of keep-alive replies
    pub const PONG: &'static str = "PONG";

    /// Returns true if the command succeeded
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Returns true if this is a reply to a keep-alive ping
    pub fn is_pong(&self) -> bool {
        self.msg == Self::PONG
    }
}

/// Classified inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Control acknowledgement
    Ack(CommandAck),
    /// Data push for a stream key; `envelope` is the full frame
    Push {
        /// Stream key reported by the frame
        key: String,
        /// Whole frame, decoded later by the topic's family
        envelope: serde_json::Value,
    },
    /// Neither shape matched
    Unrecognized(String),
}

impl Inbound {
    /// Classify a raw text frame
    ///
    /// Never fails: malformed input becomes [`Inbound::Unrecognized`].
    pub fn parse(text: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => return Self::Unrecognized(format!("invalid JSON: {}", e)),
        };

        let Some(obj) = value.as_object() else {
            return Self::Unrecognized("frame is not a JSON object".to_string());
        };

        let has_payload = obj.contains_key("c") || obj.contains_key("d");
        let has_code = obj.get("code").is_some_and(|v| v.is_i64() || v.is_u64());
        let has_msg = obj.get("msg").is_some_and(|v| v.is_string());

        if has_code && has_msg && !has_payload {
            return match serde_json::from_value::<CommandAck>(value) {
                Ok(ack) => Self::Ack(ack),
                Err(e) => Self::Unrecognized(format!("malformed acknowledgement: {}", e)),
            };
        }

        let key = obj.get("c").and_then(|v| v.as_str()).map(str::to_string);
        match key {
            Some(key) if obj.contains_key("d") => Self::Push {
                key,
                envelope: value,
            },
            _ => Self::Unrecognized("no acknowledgement or push fields".to_string()),
        }
    }
}

// ============================================================================
// Push Payloads
// ============================================================================

/// Kline push frame
#[derive(Debug, Clone, Deserialize)]
pub struct RawKline {
    /// Stream key
    #[serde(rename = "c")]
    pub key: String,
    /// Symbol (e.g. "BTCUSDT")
    #[serde(rename = "s", default)]
    pub symbol: Option<String>,
    /// Event time, epoch millis
    #[serde(rename = "t")]
    pub time: i64,
    /// Payload
    #[serde(rename = "d")]
    pub data: RawKlineData,
}

/// Kline push payload wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct RawKlineData {
    /// Candle
    #[serde(rename = "k")]
    pub kline: RawKlineContent,
}

/// Candle fields
#[derive(Debug, Clone, Deserialize)]
pub struct RawKlineContent {
    /// Window start, epoch seconds
    #[serde(rename = "t")]
    pub open_time: i64,
    /// Window end, epoch seconds
    #[serde(rename = "T")]
    pub close_time: i64,
    /// Open price
    #[serde(rename = "o")]
    pub open: Decimal,
    /// High price
    #[serde(rename = "h")]
    pub high: Decimal,
    /// Low price
    #[serde(rename = "l")]
    pub low: Decimal,
    /// Close price
    #[serde(rename = "c")]
    pub close: Decimal,
    /// Traded amount in quote currency
    #[serde(rename = "a")]
    pub volume: Decimal,
    /// Traded quantity in base currency
    #[serde(rename = "v")]
    pub quantity: Decimal,
    /// Interval code
    #[serde(rename = "i", default)]
    pub interval: Option<String>,
}

/// Private order push frame
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrder {
    /// Stream key
    #[serde(rename = "c")]
    pub key: String,
    /// Symbol (e.g. "BTCUSDT")
    #[serde(rename = "s")]
    pub symbol: String,
    /// Event time, epoch millis
    #[serde(rename = "t")]
    pub time: i64,
    /// Payload
    #[serde(rename = "d")]
    pub data: RawOrderData,
}

/// Order payload
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderData {
    /// Exchange order id
    #[serde(rename = "i")]
    pub order_id: String,
    /// Client order id
    #[serde(rename = "c", default)]
    pub client_order_id: Option<String>,
    /// Trade type code (1 buy, 2 sell)
    #[serde(rename = "S")]
    pub trade_type: i32,
    /// Order type code
    #[serde(rename = "o")]
    pub order_type: i32,
    /// Status code
    #[serde(rename = "s")]
    pub status: i32,
    /// Limit price
    #[serde(rename = "p")]
    pub price: Decimal,
    /// Order quantity
    #[serde(rename = "v")]
    pub quantity: Decimal,
    /// Order amount
    #[serde(rename = "a")]
    pub amount: Decimal,
    /// Average fill price
    #[serde(rename = "ap", default)]
    pub avg_price: Option<Decimal>,
    /// Cumulative filled quantity
    #[serde(rename = "cv", default)]
    pub cumulative_quantity: Option<Decimal>,
    /// Cumulative filled amount
    #[serde(rename = "ca", default)]
    pub cumulative_amount: Option<Decimal>,
    /// Remaining quantity
    #[serde(rename = "V", default)]
    pub remain_quantity: Option<Decimal>,
    /// Remaining amount
    #[serde(rename = "A", default)]
    pub remain_amount: Option<Decimal>,
    /// 1 if the order was maker
    #[serde(rename = "m", default)]
    pub is_maker: Option<i32>,
    /// Creation time, epoch millis
    #[serde(rename = "O")]
    pub create_time: i64,
}
