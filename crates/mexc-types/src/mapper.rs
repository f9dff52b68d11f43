//! Mapping of raw push frames into domain values
//!
//! Each topic family has one decode function taking the whole push envelope.
//! Business semantics (price sanity, order transitions) are not checked here.

use crate::enums::{Interval, OrderAction, OrderStatus, OrderType};
use crate::error::{MexcError, MexcResult};
use crate::market::{Ohlc, Order};
use crate::messages::{RawKline, RawKlineContent, RawOrder};
use crate::symbol::CurrencyPair;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

/// Decimal places of the derived average price
const AVG_PRICE_SCALE: u32 = 8;

/// Decode a kline push for the subscribed pair and interval
pub fn decode_kline(
    envelope: &serde_json::Value,
    pair: &CurrencyPair,
    interval: Interval,
) -> MexcResult<Ohlc> {
    let raw = RawKline::deserialize(envelope).map_err(|e| MexcError::decode("kline", e.to_string()))?;
    map_kline(pair, interval, &raw)
}

/// Decode a private order push
pub fn decode_order(envelope: &serde_json::Value) -> MexcResult<Order> {
    let raw = RawOrder::deserialize(envelope).map_err(|e| MexcError::decode("orders", e.to_string()))?;
    map_order(&raw)
}

/// Map a raw kline frame
pub fn map_kline(pair: &CurrencyPair, interval: Interval, raw: &RawKline) -> MexcResult<Ohlc> {
    let k = &raw.data.kline;

    Ok(Ohlc {
        pair: pair.clone(),
        interval,
        update_time: epoch_millis(raw.time)?,
        open_time: epoch_seconds(k.open_time)?,
        close_time: epoch_seconds(k.close_time)?,
        open: k.open,
        high: k.high,
        low: k.low,
        close: k.close,
        volume: k.volume,
        quantity: k.quantity,
        avg_price: avg_price(k),
    })
}

/// Map a raw order frame
pub fn map_order(raw: &RawOrder) -> MexcResult<Order> {
    let d = &raw.data;

    let action = OrderAction::from_code(d.trade_type)
        .ok_or_else(|| MexcError::decode("orders", format!("unsupported trade type {}", d.trade_type)))?;
    let order_type = OrderType::from_code(d.order_type)
        .ok_or_else(|| MexcError::decode("orders", format!("unsupported order type {}", d.order_type)))?;
    let status = OrderStatus::from_code(d.status)
        .ok_or_else(|| MexcError::decode("orders", format!("unsupported status {}", d.status)))?;

    Ok(Order {
        exchange_order_id: d.order_id.clone(),
        client_order_id: d.client_order_id.clone().filter(|id| !id.is_empty()),
        pair: CurrencyPair::from_symbol(&raw.symbol)?,
        action,
        order_type,
        status,
        price: d.price,
        quantity: d.quantity,
        amount: d.amount,
        avg_price: d.avg_price,
        cumulative_quantity: d.cumulative_quantity,
        cumulative_amount: d.cumulative_amount,
        remain_quantity: d.remain_quantity,
        remain_amount: d.remain_amount,
        is_maker: d.is_maker == Some(1),
        created_at: epoch_millis(d.create_time)?,
        updated_at: epoch_millis(raw.time)?,
    })
}

/// Average price of a candle, rounded half-up to 8 places
fn avg_price(k: &RawKlineContent) -> Decimal {
    if k.volume > Decimal::ZERO && k.quantity > Decimal::ZERO {
        (k.volume / k.quantity)
            .round_dp_with_strategy(AVG_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    }
}

fn epoch_millis(millis: i64) -> MexcResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| MexcError::decode("timestamp", format!("out of range: {} ms", millis)))
}

fn epoch_seconds(secs: i64) -> MexcResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| MexcError::decode("timestamp", format!("out of range: {} s", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn kline_frame(volume: &str, quantity: &str) -> serde_json::Value {
        json!({
            "c": "spot@public.kline.v3.api@BTCUSDT@Min1",
            "d": {
                "k": {
                    "t": 1661931900,
                    "T": 1661931960,
                    "o": "20150.5",
                    "h": "20160",
                    "l": "20140.25",
                    "c": "20155",
                    "a": volume,
                    "v": quantity,
                    "i": "Min1"
                },
                "e": "spot@public.kline.v3.api"
            },
            "s": "BTCUSDT",
            "t": 1661931916878i64
        })
    }

    #[test]
    fn test_decode_kline() {
        let pair = CurrencyPair::new("BTC", "USDT");
        let ohlc = decode_kline(&kline_frame("300", "0.015"), &pair, Interval::Min1).unwrap();

        assert_eq!(ohlc.pair, pair);
        assert_eq!(ohlc.interval, Interval::Min1);
        assert_eq!(ohlc.open, dec!(20150.5));
        assert_eq!(ohlc.low, dec!(20140.25));
        assert_eq!(ohlc.open_time.timestamp(), 1661931900);
        assert_eq!(ohlc.close_time.timestamp(), 1661931960);
        assert_eq!(ohlc.update_time.timestamp_millis(), 1661931916878);
        assert_eq!(ohlc.avg_price, dec!(20000));
    }

    #[test]
    fn test_avg_price_rounding() {
        let pair = CurrencyPair::new("BTC", "USDT");
        let ohlc = decode_kline(&kline_frame("2", "3"), &pair, Interval::Min1).unwrap();
        assert_eq!(ohlc.avg_price, dec!(0.66666667));
    }

    #[test]
    fn test_avg_price_empty_window() {
        let pair = CurrencyPair::new("BTC", "USDT");
        let ohlc = decode_kline(&kline_frame("0", "0"), &pair, Interval::Min1).unwrap();
        assert_eq!(ohlc.avg_price, Decimal::ZERO);
    }

    #[test]
    fn test_decode_kline_missing_fields() {
        let pair = CurrencyPair::new("BTC", "USDT");
        let frame = json!({"c": "spot@public.kline.v3.api@BTCUSDT@Min1", "d": {}, "t": 1});
        let err = decode_kline(&frame, &pair, Interval::Min1).unwrap_err();
        assert!(matches!(err, MexcError::Decode { .. }));
    }

    fn order_frame(status: i32) -> serde_json::Value {
        json!({
            "c": "spot@private.orders.v3.api",
            "d": {
                "A": 8.0,
                "O": 1661938138000i64,
                "S": 1,
                "V": 10,
                "a": 8,
                "c": "",
                "i": "e03a5c7441e44ed899466a7140b71391",
                "m": 0,
                "o": 1,
                "p": 0.8,
                "s": status,
                "v": 10,
                "ap": 0,
                "cv": 0,
                "ca": 0
            },
            "s": "MXUSDT",
            "t": 1661938138193i64
        })
    }

    #[test]
    fn test_decode_order() {
        let order = decode_order(&order_frame(1)).unwrap();
        assert_eq!(order.exchange_order_id, "e03a5c7441e44ed899466a7140b71391");
        assert_eq!(order.client_order_id, None);
        assert_eq!(order.pair, CurrencyPair::new("MX", "USDT"));
        assert_eq!(order.action, OrderAction::Buy);
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.price, dec!(0.8));
        assert_eq!(order.quantity, dec!(10));
        assert!(!order.is_maker);
        assert_eq!(order.created_at.timestamp_millis(), 1661938138000);
        assert_eq!(order.updated_at.timestamp_millis(), 1661938138193);
    }

    #[test]
    fn test_decode_order_unsupported_status() {
        let err = decode_order(&order_frame(9)).unwrap_err();
        assert!(err.to_string().contains("unsupported status"));
    }
}
