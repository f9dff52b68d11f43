//! Subscription registry
//!
//! The registry is the single source of truth for which topics should be
//! subscribed. Records are keyed by stream key in a [`DashMap`], so every
//! mutation is atomic per key and unrelated topics never contend on one lock.
//!
//! A record lives from `register` until a successful unsubscribe ack removes
//! it. Acks are matched by request id against the record's latest pending id
//! for that kind; any other id is stale and ignored.

use crate::correlator::RequestId;
use crate::handler::EventHandler;
use dashmap::DashMap;

/// Lifecycle state of a registered subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    /// Registered, subscribe not yet acknowledged
    Init,
    /// Server confirmed the subscription
    Subscribed,
    /// Server rejected the subscription; retried on reconnect
    SubscribeFailed,
    /// Server rejected the unsubscribe; the record stays
    UnsubscribeFailed,
}

/// One registered topic
#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    /// Stream key
    pub key: String,
    /// Current state
    pub state: SubscriptionState,
    /// Id of the latest subscribe command
    pub pending_subscribe: Option<RequestId>,
    /// Id of the latest unsubscribe command
    pub pending_unsubscribe: Option<RequestId>,
    /// Code of the last acknowledgement
    pub last_code: Option<i32>,
    /// Decode path and callback
    pub handler: EventHandler,
}

impl SubscriptionRecord {
    fn new(key: String, handler: EventHandler) -> Self {
        Self {
            key,
            state: SubscriptionState::Init,
            pending_subscribe: None,
            pending_unsubscribe: None,
            last_code: None,
            handler,
        }
    }

    /// Copy of the bookkeeping fields
    pub fn snapshot(&self) -> SubscriptionSnapshot {
        SubscriptionSnapshot {
            key: self.key.clone(),
            state: self.state,
            pending_subscribe: self.pending_subscribe,
            pending_unsubscribe: self.pending_unsubscribe,
            last_code: self.last_code,
        }
    }
}

/// Point-in-time view of a record, without its handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub key: String,
    pub state: SubscriptionState,
    pub pending_subscribe: Option<RequestId>,
    pub pending_unsubscribe: Option<RequestId>,
    pub last_code: Option<i32>,
}

/// Result of applying an acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Subscribe acknowledged with code 0
    Subscribed,
    /// Subscribe rejected
    SubscribeFailed { code: i32 },
    /// Record removed; `drained` is true if no records remain
    Unsubscribed { drained: bool },
    /// Unsubscribe rejected
    UnsubscribeFailed { code: i32 },
    /// No record for the key
    UnknownKey,
    /// Id does not match the pending id
    StaleId,
}

/// Concurrent key to record store
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    records: DashMap<String, SubscriptionRecord>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `key`
    ///
    /// A replaced record loses its pending ids, so acks for commands sent
    /// before the re-registration are stale.
    pub fn register(&self, key: impl Into<String>, handler: EventHandler) -> SubscriptionSnapshot {
        let key = key.into();
        let record = SubscriptionRecord::new(key.clone(), handler);
        let snapshot = record.snapshot();
        self.records.insert(key, record);
        snapshot
    }

    /// Store the in-flight subscribe id; false if the key is unknown
    pub fn mark_subscribe_pending(&self, key: &str, id: RequestId) -> bool {
        match self.records.get_mut(key) {
            Some(mut record) => {
                record.pending_subscribe = Some(id);
                true
            }
            None => false,
        }
    }

    /// Store the in-flight unsubscribe id; false if the key is unknown
    pub fn mark_unsubscribe_pending(&self, key: &str, id: RequestId) -> bool {
        match self.records.get_mut(key) {
            Some(mut record) => {
                record.pending_unsubscribe = Some(id);
                true
            }
            None => false,
        }
    }

    /// Restart the subscribe cycle of an existing record with a new id
    ///
    /// The record goes back to `Init` and keeps its handler. Returns `None` if
    /// the key is unknown, otherwise whether an unsubscribe was still awaiting
    /// its ack. A resolved unsubscribe id is cleared.
    pub fn rearm(&self, key: &str, id: RequestId) -> Option<bool> {
        let mut record = self.records.get_mut(key)?;
        let unsubscribing =
            record.pending_unsubscribe.is_some() && record.state != SubscriptionState::UnsubscribeFailed;
        if !unsubscribing {
            record.pending_unsubscribe = None;
        }
        record.state = SubscriptionState::Init;
        record.pending_subscribe = Some(id);
        Some(unsubscribing)
    }

    /// Apply a subscribe acknowledgement
    pub fn resolve_subscribe(&self, key: &str, id: RequestId, code: i32) -> Resolution {
        let Some(mut record) = self.records.get_mut(key) else {
            return Resolution::UnknownKey;
        };
        if record.pending_subscribe != Some(id) {
            return Resolution::StaleId;
        }

        record.last_code = Some(code);
        if code == 0 {
            record.state = SubscriptionState::Subscribed;
            Resolution::Subscribed
        } else {
            record.state = SubscriptionState::SubscribeFailed;
            Resolution::SubscribeFailed { code }
        }
    }

    /// Apply an unsubscribe acknowledgement
    ///
    /// Success removes the record.
    pub fn resolve_unsubscribe(&self, key: &str, id: RequestId, code: i32) -> Resolution {
        if code == 0 {
            let removed = self
                .records
                .remove_if(key, |_, record| record.pending_unsubscribe == Some(id));
            return match removed {
                Some(_) => Resolution::Unsubscribed {
                    drained: self.records.is_empty(),
                },
                None if self.records.contains_key(key) => Resolution::StaleId,
                None => Resolution::UnknownKey,
            };
        }

        let Some(mut record) = self.records.get_mut(key) else {
            return Resolution::UnknownKey;
        };
        if record.pending_unsubscribe != Some(id) {
            return Resolution::StaleId;
        }
        record.last_code = Some(code);
        record.state = SubscriptionState::UnsubscribeFailed;
        Resolution::UnsubscribeFailed { code }
    }

    /// Apply an acknowledgement of either kind
    ///
    /// The kind is chosen by matching `id` against the record's pending ids.
    pub fn resolve_ack(&self, key: &str, id: RequestId, code: i32) -> Resolution {
        let is_subscribe = match self.records.get(key) {
            None => return Resolution::UnknownKey,
            Some(record) if record.pending_subscribe == Some(id) => true,
            Some(record) if record.pending_unsubscribe == Some(id) => false,
            Some(_) => return Resolution::StaleId,
        };

        if is_subscribe {
            self.resolve_subscribe(key, id, code)
        } else {
            self.resolve_unsubscribe(key, id, code)
        }
    }

    /// Clone of the handler for `key`
    pub fn handler(&self, key: &str) -> Option<EventHandler> {
        self.records.get(key).map(|record| record.handler.clone())
    }

    /// Snapshot of one record
    pub fn get(&self, key: &str) -> Option<SubscriptionSnapshot> {
        self.records.get(key).map(|record| record.snapshot())
    }

    /// Snapshot of every record
    pub fn snapshot(&self) -> Vec<SubscriptionSnapshot> {
        self.records.iter().map(|entry| entry.snapshot()).collect()
    }

    /// All registered keys
    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Returns true if `key` is registered
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Number of registered records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
