//! WebSocket endpoint definitions

use std::fmt;

/// Spot stream base URL
pub const SPOT_WS_URL: &str = "wss://wbs.mexc.com/ws";

/// MEXC spot WebSocket endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// Public market data (default)
    #[default]
    Public,
    /// User data stream authorised by a listen key
    Private {
        /// Listen key obtained from the REST API
        listen_key: String,
    },
    /// Any other URL (testing, proxies)
    Custom(String),
}

impl Endpoint {
    /// Private endpoint for a listen key
    pub fn private(listen_key: impl Into<String>) -> Self {
        Self::Private {
            listen_key: listen_key.into(),
        }
    }

    /// Get the WebSocket URL for this endpoint
    pub fn url(&self) -> String {
        match self {
            Self::Public => SPOT_WS_URL.to_string(),
            Self::Private { listen_key } => format!("{}?listenKey={}", SPOT_WS_URL, listen_key),
            Self::Custom(url) => url.clone(),
        }
    }

    /// Check if this endpoint requires authentication
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Private { .. })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // keep listen keys out of logs
            Self::Private { .. } => write!(f, "{}?listenKey=***", SPOT_WS_URL),
            _ => write!(f, "{}", self.url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(Endpoint::Public.url(), "wss://wbs.mexc.com/ws");
        assert_eq!(
            Endpoint::private("abc123").url(),
            "wss://wbs.mexc.com/ws?listenKey=abc123"
        );
        assert_eq!(Endpoint::Custom("ws://localhost:9000".into()).url(), "ws://localhost:9000");
    }

    #[test]
    fn test_requires_auth() {
        assert!(!Endpoint::Public.requires_auth());
        assert!(Endpoint::private("k").requires_auth());
        assert!(!Endpoint::Custom("ws://x".into()).requires_auth());
    }

    #[test]
    fn test_display_redacts_listen_key() {
        let shown = Endpoint::private("secret-key").to_string();
        assert!(!shown.contains("secret-key"));
    }
}
