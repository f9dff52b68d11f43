//! Common test utilities and fixtures for client tests
//!
//! Frames follow the shapes pushed by the MEXC spot stream.

#![allow(dead_code)]

use async_trait::async_trait;
use mexc_auth::{AuthResult, ListenKeyStore};
use parking_lot::Mutex;
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(2);

/// Kline push for `key`
pub fn kline_frame(key: &str, symbol: &str, close: &str) -> String {
    serde_json::json!({
        "c": key,
        "d": {
            "k": {
                "t": 1661931900, "T": 1661931960,
                "o": "0.9", "h": "1.1", "l": "0.8", "c": close,
                "a": "300", "v": "300", "i": "Min5"
            },
            "e": "spot@public.kline.v3.api"
        },
        "s": symbol,
        "t": 1661931916878i64
    })
    .to_string()
}

/// Private order push (new limit buy on MXUSDT)
pub fn order_frame(status: i32) -> String {
    serde_json::json!({
        "c": "spot@private.orders.v3.api",
        "d": {
            "A": 8.0,
            "O": 1661938138000i64,
            "S": 1,
            "V": 10,
            "a": 8,
            "c": "client-1",
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
    .to_string()
}

/// In-memory listen key store
#[derive(Default)]
pub struct FakeListenKeys {
    pub keys: Mutex<Vec<String>>,
    pub extended: Mutex<Vec<String>>,
}

impl FakeListenKeys {
    pub fn with_key(key: &str) -> Self {
        Self {
            keys: Mutex::new(vec![key.to_string()]),
            extended: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ListenKeyStore for FakeListenKeys {
    async fn listen_keys(&self) -> AuthResult<Vec<String>> {
        Ok(self.keys.lock().clone())
    }

    async fn create_listen_key(&self) -> AuthResult<String> {
        let key = format!("created-{}", self.keys.lock().len());
        self.keys.lock().push(key.clone());
        Ok(key)
    }

    async fn keep_alive(&self, listen_key: &str) -> AuthResult<String> {
        self.extended.lock().push(listen_key.to_string());
        Ok(listen_key.to_string())
    }
}
