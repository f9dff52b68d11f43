//! WebSocket transport abstraction
//!
//! The connection driver talks to the network only through [`Transport`],
//! so the subscription lifecycle can be tested against [`MockTransport`].
//!
//! # Example
//!
//! ```no_run
//! use mexc_ws::transport::{Transport, WsTransport, TransportError};
//!
//! async fn example() -> Result<(), TransportError> {
//!     let mut transport = WsTransport::new("wss://wbs.mexc.com/ws");
//!     transport.connect().await?;
//!     transport.send(r#"{"method":"PING"}"#).await?;
//!     if let Some(response) = transport.recv().await? {
//!         println!("Received: {}", response);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, instrument, trace};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockServer, MockTransport};

/// Transport layer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Connection timeout
    #[error("connection timeout after {0:?}")]
    Timeout(Duration),

    /// Not connected
    #[error("not connected")]
    NotConnected,

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Trait for WebSocket transport abstraction
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to the WebSocket endpoint
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Send a text message
    async fn send(&mut self, message: &str) -> Result<(), TransportError>;

    /// Receive a text message
    ///
    /// Returns `None` if the connection was closed gracefully.
    /// Must be cancel safe: the driver polls it inside `select!`.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Close the connection gracefully
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get the endpoint URL
    fn endpoint(&self) -> &str;
}

/// Real WebSocket transport using tokio-tungstenite
pub struct WsTransport {
    url: String,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    connect_timeout: Duration,
}

impl WsTransport {
    /// Create a new WebSocket transport
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            stream: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for WsTransport {
    #[instrument(skip(self))]
    async fn connect(&mut self) -> Result<(), TransportError> {
        debug!("Connecting to WebSocket");

        let (ws_stream, _response) = timeout(self.connect_timeout, connect_async(self.url.as_str()))
            .await
            .map_err(|_| TransportError::Timeout(self.connect_timeout))?
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        self.stream = Some(ws_stream);
        debug!("WebSocket connected");
        Ok(())
    }

    #[instrument(skip(self, message), fields(len = message.len()))]
    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        stream
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data)
                        .map(Some)
                        .map_err(|e| TransportError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    self.stream = None;
                    return Ok(None);
                }
                // tungstenite answers pings itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {
                    trace!("Skipping control frame");
                }
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(TransportError::ReceiveFailed(e.to_string()));
                }
                None => {
                    self.stream = None;
                    return Err(TransportError::ConnectionClosed);
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .close(None)
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::{Transport, TransportError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, Instant};

    enum MockFrame {
        Text(String),
        Close,
        Error(String),
    }

    #[derive(Default)]
    struct ServerState {
        sent: Vec<String>,
        socket: Option<mpsc::UnboundedSender<MockFrame>>,
        connects: u32,
        fail_connects: u32,
        fail_sends: u32,
    }

    /// Server side of a [`MockTransport`]
    ///
    /// Each successful `connect()` opens a fresh in-memory socket. The server
    /// pushes frames into the current socket, drops it to simulate network
    /// loss, and records everything the client sent.
    #[derive(Clone, Default)]
    pub struct MockServer {
        state: Arc<Mutex<ServerState>>,
    }

    impl MockServer {
        /// Push a text frame to the client; false if no socket is open
        pub fn push(&self, text: impl Into<String>) -> bool {
            let state = self.state.lock();
            match state.socket.as_ref() {
                Some(tx) => tx.send(MockFrame::Text(text.into())).is_ok(),
                None => false,
            }
        }

        /// Acknowledge a command
        pub fn ack(&self, id: u32, code: i32, msg: &str) -> bool {
            self.push(serde_json::json!({"id": id, "code": code, "msg": msg}).to_string())
        }

        /// Send a close frame
        pub fn close_connection(&self) {
            if let Some(tx) = self.state.lock().socket.take() {
                let _ = tx.send(MockFrame::Close);
            }
        }

        /// Fail the current socket with a receive error
        pub fn fail_connection(&self, reason: &str) {
            if let Some(tx) = self.state.lock().socket.take() {
                let _ = tx.send(MockFrame::Error(reason.to_string()));
            }
        }

        /// Drop the current socket without a close frame
        pub fn drop_connection(&self) {
            self.state.lock().socket = None;
        }

        /// Make the next `n` connect attempts fail
        pub fn fail_next_connects(&self, n: u32) {
            self.state.lock().fail_connects = n;
        }

        /// Make the next `n` sends fail
        pub fn fail_next_sends(&self, n: u32) {
            self.state.lock().fail_sends = n;
        }

        /// Number of successful connects so far
        pub fn connect_count(&self) -> u32 {
            self.state.lock().connects
        }

        /// Whether a socket is currently open
        pub fn is_connected(&self) -> bool {
            self.state.lock().socket.as_ref().is_some_and(|tx| !tx.is_closed())
        }

        /// All messages sent by the client, in order
        pub fn sent(&self) -> Vec<String> {
            self.state.lock().sent.clone()
        }

        /// Sent messages parsed as JSON, keep-alive pings excluded
        pub fn commands(&self) -> Vec<serde_json::Value> {
            self.sent()
                .iter()
                .filter_map(|text| serde_json::from_str::<serde_json::Value>(text).ok())
                .filter(|value| value["method"] != "PING")
                .collect()
        }

        /// Commands with the given method and key
        pub fn commands_for(&self, method: &str, key: &str) -> Vec<serde_json::Value> {
            self.commands()
                .into_iter()
                .filter(|c| c["method"] == method && c["params"][0] == key)
                .collect()
        }

        /// Clear the sent log
        pub fn clear_sent(&self) {
            self.state.lock().sent.clear();
        }

        /// Wait until at least `count` non-ping commands were sent
        pub async fn wait_for_commands(&self, count: usize, within: Duration) -> bool {
            self.wait_until(within, || self.commands().len() >= count).await
        }

        /// Wait until at least `count` connects happened
        pub async fn wait_for_connects(&self, count: u32, within: Duration) -> bool {
            self.wait_until(within, || self.connect_count() >= count).await
        }

        /// Poll `condition` until it holds or `within` elapses
        pub async fn wait_until(&self, within: Duration, condition: impl Fn() -> bool) -> bool {
            let deadline = Instant::now() + within;
            loop {
                if condition() {
                    return true;
                }
                if Instant::now() >= deadline {
                    return false;
                }
                sleep(Duration::from_millis(5)).await;
            }
        }
    }

    /// Channel-scripted transport for tests
    pub struct MockTransport {
        url: String,
        server: MockServer,
        socket: Option<mpsc::UnboundedReceiver<MockFrame>>,
    }

    impl MockTransport {
        /// Create a transport and its server handle
        pub fn pair(url: impl Into<String>) -> (Self, MockServer) {
            let server = MockServer::default();
            let transport = Self {
                url: url.into(),
                server: server.clone(),
                socket: None,
            };
            (transport, server)
        }

        /// Server handle for this transport
        pub fn server(&self) -> MockServer {
            self.server.clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<(), TransportError> {
            let mut state = self.server.state.lock();
            if state.fail_connects > 0 {
                state.fail_connects -= 1;
                return Err(TransportError::ConnectionFailed("mock connection failure".into()));
            }
            let (tx, rx) = mpsc::unbounded_channel();
            state.socket = Some(tx);
            state.connects += 1;
            self.socket = Some(rx);
            Ok(())
        }

        async fn send(&mut self, message: &str) -> Result<(), TransportError> {
            if self.socket.is_none() {
                return Err(TransportError::NotConnected);
            }
            let mut state = self.server.state.lock();
            if state.fail_sends > 0 {
                state.fail_sends -= 1;
                return Err(TransportError::SendFailed("mock send failure".into()));
            }
            state.sent.push(message.to_string());
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<String>, TransportError> {
            let socket = self.socket.as_mut().ok_or(TransportError::NotConnected)?;
            match socket.recv().await {
                Some(MockFrame::Text(text)) => Ok(Some(text)),
                Some(MockFrame::Close) => {
                    self.socket = None;
                    Ok(None)
                }
                Some(MockFrame::Error(reason)) => {
                    self.socket = None;
                    Err(TransportError::ReceiveFailed(reason))
                }
                None => {
                    self.socket = None;
                    Err(TransportError::ConnectionClosed)
                }
            }
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            if self.socket.take().is_some() {
                self.server.state.lock().socket = None;
            }
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.socket.is_some()
        }

        fn endpoint(&self) -> &str {
            &self.url
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_send_recv() {
        let (mut transport, server) = MockTransport::pair("wss://mock.test");

        transport.connect().await.unwrap();
        assert!(transport.is_connected());
        assert_eq!(server.connect_count(), 1);

        transport.send(r#"{"method":"PING"}"#).await.unwrap();
        transport.send(r#"{"id":1,"method":"SUBSCRIPTION","params":["k"]}"#).await.unwrap();
        assert_eq!(server.sent().len(), 2);
        assert_eq!(server.commands().len(), 1);
        assert_eq!(server.commands_for("SUBSCRIPTION", "k").len(), 1);

        assert!(server.ack(0, 0, "PONG"));
        let response = transport.recv().await.unwrap();
        assert!(response.unwrap().contains("PONG"));
    }

    #[tokio::test]
    async fn test_mock_transport_connection_failure() {
        let (mut transport, server) = MockTransport::pair("wss://mock.test");
        server.fail_next_connects(1);

        assert!(transport.connect().await.is_err());
        assert!(!transport.is_connected());

        transport.connect().await.unwrap();
        assert_eq!(server.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_transport_close_and_drop() {
        let (mut transport, server) = MockTransport::pair("wss://mock.test");

        transport.connect().await.unwrap();
        server.close_connection();
        assert!(transport.recv().await.unwrap().is_none());
        assert!(!transport.is_connected());

        transport.connect().await.unwrap();
        server.drop_connection();
        assert_eq!(transport.recv().await, Err(TransportError::ConnectionClosed));
        assert!(!server.push("late"));
    }

    #[tokio::test]
    async fn test_mock_transport_send_failure() {
        let (mut transport, server) = MockTransport::pair("wss://mock.test");
        assert_eq!(transport.send("x").await, Err(TransportError::NotConnected));

        transport.connect().await.unwrap();
        server.fail_next_sends(1);
        assert!(transport.send("x").await.is_err());
        transport.send("y").await.unwrap();
        assert_eq!(server.sent(), vec!["y".to_string()]);
    }
}
