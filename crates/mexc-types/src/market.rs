//! Decoded domain values delivered to subscription callbacks

use crate::enums::{Interval, OrderAction, OrderStatus, OrderType};
use crate::symbol::CurrencyPair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One kline (OHLC candle) update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Traded pair
    pub pair: CurrencyPair,
    /// Candle interval
    pub interval: Interval,
    /// Time the exchange emitted this update
    pub update_time: DateTime<Utc>,
    /// Window start
    pub open_time: DateTime<Utc>,
    /// Window end
    pub close_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Traded amount in quote currency
    pub volume: Decimal,
    /// Traded quantity in base currency
    pub quantity: Decimal,
    /// `volume / quantity`, zero for empty windows
    pub avg_price: Decimal,
}

/// Private order update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub exchange_order_id: String,
    pub client_order_id: Option<String>,
    pub pair: CurrencyPair,
    pub action: OrderAction,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub price: Decimal,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub avg_price: Option<Decimal>,
    pub cumulative_quantity: Option<Decimal>,
    pub cumulative_amount: Option<Decimal>,
    pub remain_quantity: Option<Decimal>,
    pub remain_amount: Option<Decimal>,
    pub is_maker: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
