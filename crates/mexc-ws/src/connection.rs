//! WebSocket connection management
//!
//! A [`Connection`] owns one background driver task, started once by
//! [`Connection::open`]. The driver holds the transport exclusively: callers
//! only push text frames onto an unbounded queue, so no caller ever blocks on
//! a lock held by the reconnect logic.
//!
//! The driver connects, reports `on_open` to its listener, then pumps queued
//! frames out and inbound frames in until the socket is lost, suspended or
//! shut down. After an unexpected loss it reconnects following the
//! [`ReconnectConfig`] schedule and reports `on_open` with
//! `is_reconnection = true`.

use crate::endpoint::Endpoint;
use crate::events::{ConnectInfo, DisconnectReason};
use crate::hooks::Hooks;
use crate::manager::CommandSink;
use crate::reconnect::ReconnectConfig;
use crate::transport::{Transport, TransportError, WsTransport};

use mexc_types::{Command, MexcError, MexcResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// WebSocket connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; the next send opens the connection
    Idle,
    /// Connection in progress
    Connecting,
    /// Connected and ready
    Connected,
    /// Reconnecting after an unexpected loss
    Reconnecting,
    /// Driver stopped
    Closed,
}

/// Configuration for the WebSocket connection
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket endpoint
    pub endpoint: Endpoint,
    /// Reconnection settings
    pub reconnect: ReconnectConfig,
    /// Timeout of one connect attempt; also bounds how long `send` waits
    pub connect_timeout: Duration,
    /// Interval of application-level PING frames
    pub ping_interval: Duration,
    /// Connection is considered lost after this long without inbound frames
    pub stale_timeout: Duration,
    /// Close the connection when the last subscription is removed
    pub close_when_idle: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Public,
            reconnect: ReconnectConfig::default(),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(20),
            stale_timeout: Duration::from_secs(60),
            close_when_idle: true,
        }
    }
}

impl ConnectionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set reconnection config
    pub fn with_reconnect(mut self, config: ReconnectConfig) -> Self {
        self.reconnect = config;
        self
    }

    /// Disable automatic reconnection
    pub fn without_reconnect(mut self) -> Self {
        self.reconnect = ReconnectConfig::disabled();
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set keep-alive ping interval
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Set the inbound silence limit
    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_timeout = timeout;
        self
    }

    /// Enable or disable closing the connection when idle
    pub fn with_close_when_idle(mut self, enabled: bool) -> Self {
        self.close_when_idle = enabled;
        self
    }
}

/// Receiver of connection lifecycle callbacks
///
/// Callbacks run on the driver task, one at a time, in delivery order.
pub trait ConnectionListener: Send + Sync {
    /// Connection opened
    fn on_open(&self, info: &ConnectInfo);

    /// Text frame received
    fn on_message(&self, text: &str);

    /// Transport error; the connection is about to be reported lost
    fn on_error(&self, _error: &TransportError) {}

    /// Connection closed
    fn on_close(&self, _reason: &DisconnectReason) {}

    /// Consulted before a suspend; false keeps the connection open
    fn is_idle(&self) -> bool {
        true
    }
}

enum Outbound {
    Text(String),
    Suspend,
    Shutdown,
}

struct Driver {
    transport: Box<dyn Transport>,
    outbound_rx: mpsc::UnboundedReceiver<Outbound>,
}

struct Shared {
    config: ConnectionConfig,
    hooks: Hooks,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
    driver: Mutex<Option<Driver>>,
    task: Mutex<Option<JoinHandle<()>>>,
    state: watch::Sender<ConnectionState>,
    shutdown: AtomicBool,
    shutdown_notify: Notify,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            trace!(?previous, ?state, "Connection state changed");
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}

/// Handle to a managed WebSocket connection
///
/// Cheap to clone; all clones drive the same connection.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl Connection {
    /// Create a connection over a transport; nothing happens until [`open`](Self::open)
    pub fn new(config: ConnectionConfig, transport: Box<dyn Transport>, hooks: Hooks) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Idle);

        Self {
            shared: Arc::new(Shared {
                config,
                hooks,
                outbound_tx,
                driver: Mutex::new(Some(Driver {
                    transport,
                    outbound_rx,
                })),
                task: Mutex::new(None),
                state,
                shutdown: AtomicBool::new(false),
                shutdown_notify: Notify::new(),
            }),
        }
    }

    /// Create a connection using the tokio-tungstenite transport
    pub fn websocket(config: ConnectionConfig, hooks: Hooks) -> Self {
        let transport = WsTransport::new(config.endpoint.url()).with_timeout(config.connect_timeout);
        Self::new(config, Box::new(transport), hooks)
    }

    /// Start the driver task
    ///
    /// Only the first call starts anything; later calls return false. Must be
    /// called from within a tokio runtime.
    pub fn open(&self, listener: Arc<dyn ConnectionListener>) -> bool {
        if self.shared.is_shutdown() {
            return false;
        }
        let Some(driver) = self.shared.driver.lock().take() else {
            return false;
        };

        let handle = tokio::spawn(run(self.shared.clone(), driver, listener));
        *self.shared.task.lock() = Some(handle);
        true
    }

    /// Returns true once [`open`](Self::open) has started the driver
    pub fn is_started(&self) -> bool {
        self.shared.driver.lock().is_none()
    }

    /// Get the current connection state
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns true after [`shutdown`](Self::shutdown)
    pub fn is_shutdown(&self) -> bool {
        self.shared.is_shutdown()
    }

    /// Watch state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Endpoint this connection talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.config.endpoint
    }

    /// Timeout of one connect attempt
    pub fn connect_timeout(&self) -> Duration {
        self.shared.config.connect_timeout
    }

    /// Queue a text frame without waiting
    pub fn enqueue(&self, text: String) -> MexcResult<()> {
        if self.shared.is_shutdown() {
            return Err(MexcError::ShuttingDown);
        }
        self.shared
            .outbound_tx
            .send(Outbound::Text(text))
            .map_err(|_| MexcError::ChannelClosed)
    }

    /// Queue a text frame, then wait until the connection is open
    ///
    /// The wait is bounded by the connect timeout. Running out of time is not
    /// an error: the frame stays queued and is sent once connected.
    pub async fn send(&self, text: String) -> MexcResult<()> {
        self.enqueue(text)?;
        self.wait_connected().await;
        Ok(())
    }

    /// Wait until connected, bounded by the connect timeout
    pub async fn wait_connected(&self) -> bool {
        let within = self.shared.config.connect_timeout;
        let mut rx = self.shared.state.subscribe();

        let reached = timeout(
            within,
            rx.wait_for(|s| matches!(s, ConnectionState::Connected | ConnectionState::Closed)),
        )
        .await;

        match reached {
            Ok(Ok(state)) => *state == ConnectionState::Connected,
            Ok(Err(_)) => false,
            Err(_) => {
                warn!(timeout = ?within, "Connection not open yet, queued frames are sent once connected");
                false
            }
        }
    }

    /// Close the socket if the listener reports idle; the next send reopens it
    pub fn suspend(&self) {
        let _ = self.shared.outbound_tx.send(Outbound::Suspend);
    }

    /// Stop the driver after flushing already queued frames
    ///
    /// Later sends fail with [`MexcError::ShuttingDown`].
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Shutdown requested");
        let _ = self.shared.outbound_tx.send(Outbound::Shutdown);
        self.shared.shutdown_notify.notify_one();

        if !self.is_started() {
            self.shared.set_state(ConnectionState::Closed);
        }
    }

    /// Shut down and wait for the driver task to finish
    pub async fn close(&self) {
        self.shutdown();

        let handle = self.shared.task.lock().take();
        if let Some(handle) = handle {
            if timeout(self.shared.config.connect_timeout, handle).await.is_err() {
                warn!("Connection task did not stop in time");
            }
        }
    }
}

impl CommandSink for Connection {
    fn enqueue(&self, text: String) -> MexcResult<()> {
        Connection::enqueue(self, text)
    }

    fn suspend(&self) {
        Connection::suspend(self)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.shared.config.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Driver
// ============================================================================

async fn run(shared: Arc<Shared>, mut driver: Driver, listener: Arc<dyn ConnectionListener>) {
    let endpoint = shared.config.endpoint.to_string();
    let mut backlog: VecDeque<String> = VecDeque::new();
    let mut reconnecting = false;

    loop {
        if !connect(&shared, &mut driver, reconnecting).await {
            break;
        }

        shared.set_state(ConnectionState::Connected);
        let info = ConnectInfo {
            endpoint: endpoint.clone(),
            is_reconnection: reconnecting,
        };
        info!(endpoint = %endpoint, reconnection = reconnecting, "Connection opened");
        shared.hooks.invoke_connect(&info);
        listener.on_open(&info);

        let reason = pump(&shared, &mut driver, &mut backlog, listener.as_ref()).await;
        if let Err(e) = driver.transport.close().await {
            debug!(error = %e, "Error while closing transport");
        }
        info!(?reason, "Connection closed");
        shared.hooks.invoke_disconnect(&reason);
        listener.on_close(&reason);

        match reason {
            DisconnectReason::Shutdown => break,
            DisconnectReason::Idle => {
                shared.set_state(ConnectionState::Idle);
                reconnecting = false;
                match wait_for_work(&mut driver.outbound_rx).await {
                    Some(text) => backlog.push_back(text),
                    None => break,
                }
            }
            _ => reconnecting = true,
        }
    }

    // release the queue before publishing Closed so later sends fail
    drop(driver);
    shared.set_state(ConnectionState::Closed);
    debug!("Connection driver stopped");
}

/// Connect, retrying per the reconnect schedule. False if the driver must stop.
async fn connect(shared: &Shared, driver: &mut Driver, reconnecting: bool) -> bool {
    let reconnect = &shared.config.reconnect;
    let mut attempt: u32 = 0;
    let mut wait = reconnecting;

    shared.set_state(if reconnecting {
        ConnectionState::Reconnecting
    } else {
        ConnectionState::Connecting
    });

    loop {
        if wait {
            if !reconnect.should_reconnect(attempt) {
                error!(attempts = attempt, "Reconnection attempts exhausted");
                shared.hooks.invoke_error("reconnection attempts exhausted");
                return false;
            }
            attempt += 1;
            let delay = reconnect.delay_with_jitter(attempt);
            debug!(attempt, ?delay, "Reconnecting");
            shared.hooks.invoke_reconnect_attempt(attempt, delay);
            shared.set_state(ConnectionState::Reconnecting);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shared.shutdown_notify.notified() => return false,
            }
        }
        if shared.is_shutdown() {
            return false;
        }

        info!(endpoint = %shared.config.endpoint, "Opening connection");
        let result = tokio::select! {
            result = timeout(shared.config.connect_timeout, driver.transport.connect()) => result,
            _ = shared.shutdown_notify.notified() => return false,
        };

        match result {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => {
                warn!(error = %e, "Couldn't open connection, will try again");
                shared.hooks.invoke_error(&e.to_string());
            }
            Err(_) => {
                warn!(timeout = ?shared.config.connect_timeout, "Connection attempt timed out");
                shared.hooks.invoke_error("connection attempt timed out");
            }
        }
        wait = true;
    }
}

/// Move frames both ways until the connection ends
async fn pump(
    shared: &Shared,
    driver: &mut Driver,
    backlog: &mut VecDeque<String>,
    listener: &dyn ConnectionListener,
) -> DisconnectReason {
    while let Some(text) = backlog.pop_front() {
        if let Err(e) = driver.transport.send(&text).await {
            backlog.push_front(text);
            return lost(shared, listener, e);
        }
    }

    let period = shared.config.ping_interval;
    let mut ping = interval_at(Instant::now() + period, period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_inbound = Instant::now();

    loop {
        tokio::select! {
            outbound = driver.outbound_rx.recv() => match outbound {
                Some(Outbound::Text(text)) => {
                    trace!(message = %text, "Sending message");
                    if let Err(e) = driver.transport.send(&text).await {
                        backlog.push_back(text);
                        return lost(shared, listener, e);
                    }
                }
                Some(Outbound::Suspend) => {
                    if listener.is_idle() {
                        return DisconnectReason::Idle;
                    }
                    debug!("Suspend skipped, subscriptions registered meanwhile");
                }
                Some(Outbound::Shutdown) | None => return DisconnectReason::Shutdown,
            },
            inbound = driver.transport.recv() => match inbound {
                Ok(Some(text)) => {
                    last_inbound = Instant::now();
                    listener.on_message(&text);
                }
                Ok(None) => return DisconnectReason::ServerClosed,
                Err(e) => return lost(shared, listener, e),
            },
            _ = ping.tick() => {
                if last_inbound.elapsed() >= shared.config.stale_timeout {
                    warn!(silence = ?last_inbound.elapsed(), "No frames received, connection is stale");
                    return DisconnectReason::HeartbeatTimeout;
                }
                match Command::ping().to_json() {
                    Ok(frame) => {
                        if let Err(e) = driver.transport.send(&frame).await {
                            return lost(shared, listener, e);
                        }
                    }
                    Err(e) => warn!(error = %e, "Couldn't serialize ping"),
                }
            }
        }
    }
}

fn lost(shared: &Shared, listener: &dyn ConnectionListener, error: TransportError) -> DisconnectReason {
    warn!(error = %error, "Connection error");
    shared.hooks.invoke_error(&error.to_string());
    listener.on_error(&error);
    DisconnectReason::NetworkError(error.to_string())
}

async fn wait_for_work(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Option<String> {
    loop {
        match rx.recv().await {
            Some(Outbound::Text(text)) => return Some(text),
            Some(Outbound::Suspend) => continue,
            Some(Outbound::Shutdown) | None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockServer, MockTransport};
    use std::sync::atomic::AtomicU32;

    const WAIT: Duration = Duration::from_secs(2);

    #[derive(Default)]
    struct Recorder {
        opens: Mutex<Vec<bool>>,
        messages: Mutex<Vec<String>>,
        closes: Mutex<Vec<DisconnectReason>>,
        errors: AtomicU32,
        busy: AtomicBool,
    }

    impl ConnectionListener for Recorder {
        fn on_open(&self, info: &ConnectInfo) {
            self.opens.lock().push(info.is_reconnection);
        }

        fn on_message(&self, text: &str) {
            self.messages.lock().push(text.to_string());
        }

        fn on_error(&self, _error: &TransportError) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_close(&self, reason: &DisconnectReason) {
            self.closes.lock().push(reason.clone());
        }

        fn is_idle(&self) -> bool {
            !self.busy.load(Ordering::SeqCst)
        }
    }

    fn fast_config() -> ConnectionConfig {
        ConnectionConfig::new()
            .with_endpoint(Endpoint::Custom("wss://mock.test".into()))
            .with_reconnect(ReconnectConfig::fixed(Duration::from_millis(10)))
            .with_timeout(Duration::from_secs(1))
    }

    fn setup(config: ConnectionConfig) -> (Connection, MockServer, Arc<Recorder>) {
        let (transport, server) = MockTransport::pair("wss://mock.test");
        let connection = Connection::new(config, Box::new(transport), Hooks::new());
        (connection, server, Arc::new(Recorder::default()))
    }

    #[test]
    fn test_connection_config() {
        let config = ConnectionConfig::new()
            .with_endpoint(Endpoint::private("key"))
            .with_timeout(Duration::from_secs(5))
            .with_ping_interval(Duration::from_secs(10))
            .with_close_when_idle(false);

        assert_eq!(config.endpoint, Endpoint::private("key"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.ping_interval, Duration::from_secs(10));
        assert_eq!(config.stale_timeout, Duration::from_secs(60));
        assert!(!config.close_when_idle);
    }

    #[tokio::test]
    async fn test_open_is_one_shot() {
        let (connection, server, recorder) = setup(fast_config());
        assert_eq!(connection.state(), ConnectionState::Idle);

        assert!(connection.open(recorder.clone()));
        assert!(!connection.open(recorder.clone()));
        assert!(connection.wait_connected().await);
        assert_eq!(server.connect_count(), 1);
        assert_eq!(*recorder.opens.lock(), vec![false]);

        connection.close().await;
        assert_eq!(connection.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_frames_queued_before_connect_are_flushed() {
        let (connection, server, recorder) = setup(fast_config());
        server.fail_next_connects(2);

        connection.enqueue("one".into()).unwrap();
        connection.open(recorder.clone());
        connection.send("two".into()).await.unwrap();

        assert!(server.wait_until(WAIT, || server.sent().len() == 2).await);
        assert_eq!(server.sent(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(*recorder.opens.lock(), vec![false]);
        connection.close().await;
    }

    #[tokio::test]
    async fn test_reconnect_reports_reconnection() {
        let (connection, server, recorder) = setup(fast_config());
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        server.drop_connection();
        assert!(server.wait_for_connects(2, WAIT).await);
        assert!(server.wait_until(WAIT, || recorder.opens.lock().len() == 2).await);

        assert_eq!(*recorder.opens.lock(), vec![false, true]);
        assert_eq!(
            recorder.closes.lock()[0],
            DisconnectReason::NetworkError("connection closed".into())
        );
        assert_eq!(recorder.errors.load(Ordering::SeqCst), 1);
        connection.close().await;
    }

    #[tokio::test]
    async fn test_inbound_frames_reach_listener_in_order() {
        let (connection, server, recorder) = setup(fast_config());
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        for i in 0..5 {
            server.push(format!("frame-{}", i));
        }
        assert!(server.wait_until(WAIT, || recorder.messages.lock().len() == 5).await);
        let expected: Vec<String> = (0..5).map(|i| format!("frame-{}", i)).collect();
        assert_eq!(*recorder.messages.lock(), expected);
        connection.close().await;
    }

    #[tokio::test]
    async fn test_suspend_and_reopen_is_fresh_session() {
        let (connection, server, recorder) = setup(fast_config());
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        connection.suspend();
        assert!(server.wait_until(WAIT, || connection.state() == ConnectionState::Idle).await);
        assert!(!server.is_connected());
        assert_eq!(recorder.closes.lock()[0], DisconnectReason::Idle);

        connection.send("again".into()).await.unwrap();
        assert!(server.wait_until(WAIT, || server.sent() == vec!["again".to_string()]).await);
        assert_eq!(server.connect_count(), 2);
        assert_eq!(*recorder.opens.lock(), vec![false, false]);
        connection.close().await;
    }

    #[tokio::test]
    async fn test_suspend_skipped_when_busy() {
        let (connection, server, recorder) = setup(fast_config());
        recorder.busy.store(true, Ordering::SeqCst);
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        connection.suspend();
        connection.enqueue("still-open".into()).unwrap();
        assert!(server.wait_until(WAIT, || server.sent().len() == 1).await);
        assert!(connection.is_connected());
        assert_eq!(server.connect_count(), 1);
        connection.close().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_then_rejects() {
        let (connection, server, recorder) = setup(fast_config());
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        connection.enqueue("last".into()).unwrap();
        connection.close().await;

        assert_eq!(server.sent(), vec!["last".to_string()]);
        assert!(matches!(connection.enqueue("late".into()), Err(MexcError::ShuttingDown)));
        assert!(!connection.open(recorder.clone()));
        assert_eq!(*recorder.closes.lock(), vec![DisconnectReason::Shutdown]);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_retry_loop() {
        let config = fast_config().with_reconnect(ReconnectConfig::fixed(Duration::from_secs(60)));
        let (connection, server, recorder) = setup(config);
        server.fail_next_connects(1);

        connection.open(recorder.clone());
        assert!(server.wait_until(WAIT, || connection.state() == ConnectionState::Reconnecting).await);
        connection.close().await;

        assert_eq!(connection.state(), ConnectionState::Closed);
        assert_eq!(server.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_reconnect_attempts_exhausted() {
        let config = fast_config().with_reconnect(ReconnectConfig::fixed(Duration::from_millis(5)).with_max_attempts(2));
        let (connection, server, recorder) = setup(config);
        server.fail_next_connects(10);

        connection.open(recorder.clone());
        assert!(server.wait_until(WAIT, || connection.state() == ConnectionState::Closed).await);
        assert!(matches!(connection.enqueue("x".into()), Err(MexcError::ChannelClosed)));
        assert!(recorder.opens.lock().is_empty());
    }

    #[tokio::test]
    async fn test_stale_connection_is_replaced() {
        let config = fast_config()
            .with_ping_interval(Duration::from_millis(20))
            .with_stale_timeout(Duration::from_millis(50));
        let (connection, server, recorder) = setup(config);
        connection.open(recorder.clone());

        assert!(server.wait_for_connects(2, WAIT).await);
        assert_eq!(recorder.closes.lock()[0], DisconnectReason::HeartbeatTimeout);
        assert!(server.sent().iter().any(|s| s == r#"{"method":"PING"}"#));
        connection.close().await;
    }

    #[tokio::test]
    async fn test_failed_send_is_retried_after_reconnect() {
        let (connection, server, recorder) = setup(fast_config());
        connection.open(recorder.clone());
        assert!(connection.wait_connected().await);

        server.fail_next_sends(1);
        connection.enqueue("important".into()).unwrap();

        assert!(server.wait_until(WAIT, || server.sent() == vec!["important".to_string()]).await);
        assert_eq!(server.connect_count(), 2);
        connection.close().await;
    }
}
