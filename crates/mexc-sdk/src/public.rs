//! Public market data client

use crate::builder::ClientBuilder;
use mexc_types::{CurrencyPair, Interval, MexcResult, Ohlc, Topic};
use mexc_ws::{
    ConnectionState, EventHandler, RequestId, StreamClient, SubscriptionSnapshot, SubscriptionState,
};
use tracing::instrument;

/// Client for public kline streams
///
/// # Example
///
/// ```no_run
/// use mexc_sdk::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PublicClient::new()?;
///
///     client
///         .subscribe_kline("BTC/USDT".parse()?, Interval::Min1, |ohlc| {
///             println!("{} close={}", ohlc.pair, ohlc.close);
///         })
///         .await?;
///
///     tokio::signal::ctrl_c().await?;
///     client.close().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PublicClient {
    stream: StreamClient,
}

impl PublicClient {
    /// Create a new client builder
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings
    pub fn new() -> Result<Self, crate::ConfigError> {
        ClientBuilder::new().build_public()
    }

    pub(crate) fn from_stream(stream: StreamClient) -> Self {
        Self { stream }
    }

    /// Subscribe to candles for a pair and interval
    ///
    /// Subscribing again replaces the callback.
    #[instrument(skip(self, callback), fields(pair = %pair, interval = %interval))]
    pub async fn subscribe_kline<F>(&self, pair: CurrencyPair, interval: Interval, callback: F) -> MexcResult<RequestId>
    where
        F: Fn(Ohlc) + Send + Sync + 'static,
    {
        self.stream
            .subscribe(EventHandler::kline(pair, interval, callback))
            .await
    }

    /// Unsubscribe from candles for a pair and interval
    pub async fn unsubscribe_kline(&self, pair: CurrencyPair, interval: Interval) -> MexcResult<Option<RequestId>> {
        self.stream.unsubscribe(&Topic::kline(pair, interval)).await
    }

    /// Subscription state of a kline stream
    pub fn kline_state(&self, pair: CurrencyPair, interval: Interval) -> Option<SubscriptionState> {
        self.stream.subscription_state(&Topic::kline(pair, interval))
    }

    /// Snapshot of every registered topic
    pub fn subscriptions(&self) -> Vec<SubscriptionSnapshot> {
        self.stream.subscriptions()
    }

    /// Get the connection state
    pub fn state(&self) -> ConnectionState {
        self.stream.connection_state()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.stream.connection().is_connected()
    }

    /// Underlying stream client
    pub fn stream(&self) -> &StreamClient {
        &self.stream
    }

    /// Unsubscribe everything and shut down
    pub async fn close(&self) {
        self.stream.close().await;
    }
}
