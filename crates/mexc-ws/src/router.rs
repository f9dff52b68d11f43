//! Inbound frame routing
//!
//! Every text frame is classified once and then either applied to the
//! registry (acknowledgements) or decoded by the subscription's handler
//! (pushes). Nothing here returns an error: frames from the network are
//! untrusted and anything unexpected is logged and dropped.

use crate::correlator::RequestId;
use crate::events::SubscriptionEvent;
use crate::hooks::Hooks;
use crate::registry::{Resolution, SubscriptionRegistry};
use mexc_types::{CommandAck, Inbound};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// What the router did with a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// Acknowledgement applied to the registry
    Ack(Resolution),
    /// Keep-alive reply
    Pong,
    /// Push decoded and delivered to the callback
    Delivered,
    /// Push for a key with no record
    UnknownTopic,
    /// Push that failed to decode
    DecodeFailed,
    /// Frame matched no known shape
    Unrecognized,
}

/// Routes inbound frames to the registry and handlers
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<SubscriptionRegistry>,
    hooks: Hooks,
}

impl Router {
    /// Create a router over a registry
    pub fn new(registry: Arc<SubscriptionRegistry>, hooks: Hooks) -> Self {
        Self { registry, hooks }
    }

    /// Route one text frame
    pub fn route(&self, text: &str) -> Routed {
        trace!(frame = %text, "Routing frame");

        match Inbound::parse(text) {
            Inbound::Ack(ack) if ack.is_pong() => {
                debug!("PONG received");
                Routed::Pong
            }
            Inbound::Ack(ack) => Routed::Ack(self.apply_ack(&ack)),
            Inbound::Push { key, envelope } => {
                // clone the handler out so the callback runs without a shard lock
                let Some(handler) = self.registry.handler(&key) else {
                    warn!(key = %key, "Push for unknown topic dropped");
                    return Routed::UnknownTopic;
                };
                match handler.dispatch(&envelope) {
                    Ok(()) => Routed::Delivered,
                    Err(e) => {
                        warn!(key = %key, error = %e, "Failed to decode push");
                        self.hooks.invoke_error(&e.to_string());
                        Routed::DecodeFailed
                    }
                }
            }
            Inbound::Unrecognized(reason) => {
                warn!(reason = %reason, frame = %text, "Unrecognized frame dropped");
                Routed::Unrecognized
            }
        }
    }

    fn apply_ack(&self, ack: &CommandAck) -> Resolution {
        let key = ack.msg.as_str();
        let id = RequestId(ack.id);
        let resolution = self.registry.resolve_ack(key, id, ack.code);

        let event = match resolution {
            Resolution::Subscribed => {
                info!(key, %id, "Subscribed");
                SubscriptionEvent::Subscribed { key: key.to_string(), id }
            }
            Resolution::SubscribeFailed { code } => {
                warn!(key, %id, code, "Subscribe rejected");
                SubscriptionEvent::Rejected { key: key.to_string(), id, code }
            }
            Resolution::Unsubscribed { drained } => {
                info!(key, %id, drained, "Unsubscribed");
                SubscriptionEvent::Unsubscribed { key: key.to_string(), id }
            }
            Resolution::UnsubscribeFailed { code } => {
                warn!(key, %id, code, "Unsubscribe rejected");
                SubscriptionEvent::UnsubscribeRejected { key: key.to_string(), id, code }
            }
            Resolution::UnknownKey => {
                warn!(key, %id, code = ack.code, "Acknowledgement for unknown topic");
                return resolution;
            }
            Resolution::StaleId => {
                debug!(key, %id, "Stale acknowledgement ignored");
                return resolution;
            }
        };

        self.hooks.invoke_subscription(&event);
        resolution
    }
}
