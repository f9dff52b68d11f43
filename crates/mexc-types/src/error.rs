//! Error types for the MEXC client

use std::time::Duration;
use thiserror::Error;

/// Main error type for MEXC client operations
#[derive(Error, Debug)]
pub enum MexcError {
    // === Connection Errors ===
    /// Failed to establish WebSocket connection
    #[error("Failed to connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// Connection attempt timed out
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    // === Protocol Errors ===
    /// Failed to parse or serialize a JSON message
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, raw: Option<String> },

    /// A push payload could not be mapped to a domain value
    #[error("Failed to decode {topic} payload: {reason}")]
    Decode { topic: String, reason: String },

    // === Topic Errors ===
    /// Interval has no MEXC kline code
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),

    /// Symbol cannot be split into base and quote currency
    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    // === Internal Errors ===
    /// Internal channel was closed unexpectedly
    #[error("Internal channel closed unexpectedly")]
    ChannelClosed,

    /// Client is shutting down or already closed
    #[error("Shutdown in progress")]
    ShuttingDown,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MexcError {
    /// Returns true if this error is potentially recoverable via retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. } | Self::WebSocket(_)
        )
    }

    /// Returns true if this error requires reconnection
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::WebSocket(_) | Self::ConnectionFailed { .. } | Self::ChannelClosed
        )
    }

    /// Create a decode error for a topic
    pub fn decode(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MexcError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: err.to_string(),
            raw: None,
        }
    }
}

/// Result type alias for MEXC operations
pub type MexcResult<T> = Result<T, MexcError>;
