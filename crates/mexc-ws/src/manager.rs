//! Subscription manager
//!
//! Ties the correlator, registry and router together behind the caller-facing
//! `subscribe` / `unsubscribe` entry points, and re-issues every registered
//! subscription when the connection reports a reconnect.

use crate::connection::ConnectionListener;
use crate::correlator::{RequestId, RequestIds};
use crate::events::{ConnectInfo, DisconnectReason};
use crate::handler::EventHandler;
use crate::hooks::Hooks;
use crate::registry::{Resolution, SubscriptionRegistry, SubscriptionSnapshot, SubscriptionState};
use crate::router::{Routed, Router};
use crate::transport::TransportError;
use mexc_types::{Command, MexcResult, Topic};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outbound side used by the manager
///
/// `enqueue` must not block; delivery happens once the connection is open.
pub trait CommandSink: Send + Sync {
    /// Queue a text frame for sending
    fn enqueue(&self, text: String) -> MexcResult<()>;

    /// Ask for the connection to be closed until the next send
    fn suspend(&self) {}
}

/// Subscription lifecycle state machine
pub struct SubscriptionManager<S> {
    ids: RequestIds,
    registry: Arc<SubscriptionRegistry>,
    router: Router,
    sink: S,
    close_when_idle: bool,
}

impl<S: CommandSink> SubscriptionManager<S> {
    /// Create a manager sending through `sink`
    pub fn new(sink: S, hooks: Hooks, close_when_idle: bool) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new());
        Self {
            ids: RequestIds::new(),
            router: Router::new(registry.clone(), hooks),
            registry,
            sink,
            close_when_idle,
        }
    }

    /// Register a handler and send a subscribe command for its topic
    ///
    /// Re-subscribing a registered topic replaces its handler and always sends
    /// a new command; only the newest id can confirm it.
    pub fn subscribe(&self, handler: EventHandler) -> MexcResult<RequestId> {
        let key = handler.topic().key();
        self.registry.register(key.clone(), handler);
        let id = self.ids.next_id();
        if !self.registry.mark_subscribe_pending(&key, id) {
            debug!(key = %key, "Topic removed before subscribe was sent");
            return Ok(id);
        }
        self.send_subscribe(&key, id)?;
        Ok(id)
    }

    /// Send an unsubscribe command for a topic
    ///
    /// Returns `Ok(None)` without sending anything if the topic is not registered.
    pub fn unsubscribe(&self, topic: &Topic) -> MexcResult<Option<RequestId>> {
        self.unsubscribe_key(&topic.key())
    }

    /// Send an unsubscribe command for a stream key
    pub fn unsubscribe_key(&self, key: &str) -> MexcResult<Option<RequestId>> {
        if !self.registry.contains(key) {
            debug!(key, "Unsubscribe for unregistered topic ignored");
            return Ok(None);
        }

        let id = self.ids.next_id();
        if !self.registry.mark_unsubscribe_pending(key, id) {
            return Ok(None);
        }
        let text = Command::unsubscribe(id.get(), key).to_json()?;
        debug!(key, %id, "Sending unsubscribe");
        self.sink.enqueue(text)?;
        Ok(Some(id))
    }

    /// Re-issue a subscribe command for every registered topic
    ///
    /// Each record restarts from `Init`; failed records are retried too. A
    /// topic whose unsubscribe was still unacknowledged gets a fresh
    /// unsubscribe queued behind its subscribe. Returns the number of
    /// subscribe commands queued.
    pub fn resubscribe_all(&self) -> usize {
        let keys = self.registry.keys();
        if keys.is_empty() {
            return 0;
        }

        info!(count = keys.len(), "Re-subscribing after reconnect");
        let mut sent = 0;
        for key in keys {
            let id = self.ids.next_id();
            let Some(unsubscribing) = self.registry.rearm(&key, id) else {
                debug!(key = %key, "Topic removed before re-subscribe");
                continue;
            };
            if let Err(e) = self.send_subscribe(&key, id) {
                warn!(key = %key, error = %e, "Couldn't re-subscribe");
                continue;
            }
            sent += 1;
            if unsubscribing {
                if let Err(e) = self.unsubscribe_key(&key) {
                    warn!(key = %key, error = %e, "Couldn't repeat unsubscribe");
                }
            }
        }
        sent
    }

    /// Send an unsubscribe for every registered topic
    ///
    /// Per-key failures are logged and do not stop the rest. Returns the number
    /// of commands queued.
    pub fn unsubscribe_all(&self) -> usize {
        let keys = self.registry.keys();
        if !keys.is_empty() {
            info!(count = keys.len(), "Cancelling subscription(s) before closing");
        }

        keys.iter()
            .filter(|key| match self.unsubscribe_key(key) {
                Ok(id) => id.is_some(),
                Err(e) => {
                    warn!(key = %key, error = %e, "Couldn't unsubscribe");
                    false
                }
            })
            .count()
    }

    /// Route one inbound frame and close the connection once idle
    pub fn handle_frame(&self, text: &str) -> Routed {
        let routed = self.router.route(text);
        if self.close_when_idle && routed == Routed::Ack(Resolution::Unsubscribed { drained: true }) {
            info!("No open subscriptions, closing connection");
            self.sink.suspend();
        }
        routed
    }

    /// Current state of a topic
    pub fn state(&self, topic: &Topic) -> Option<SubscriptionState> {
        self.registry.get(&topic.key()).map(|s| s.state)
    }

    /// Snapshot of every registered topic
    pub fn subscriptions(&self) -> Vec<SubscriptionSnapshot> {
        self.registry.snapshot()
    }

    /// Underlying registry
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Outbound sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn send_subscribe(&self, key: &str, id: RequestId) -> MexcResult<()> {
        let text = Command::subscribe(id.get(), key).to_json()?;
        debug!(key, %id, "Sending subscribe");
        self.sink.enqueue(text)
    }
}

impl<S: CommandSink> ConnectionListener for SubscriptionManager<S> {
    fn on_open(&self, info: &ConnectInfo) {
        if info.is_reconnection {
            self.resubscribe_all();
        }
    }

    fn on_message(&self, text: &str) {
        self.handle_frame(text);
    }

    fn on_error(&self, error: &TransportError) {
        debug!(error = %error, "Transport error");
    }

    fn on_close(&self, reason: &DisconnectReason) {
        debug!(?reason, remaining = self.registry.len(), "Connection closed");
    }

    fn is_idle(&self) -> bool {
        self.registry.is_empty()
    }
}
