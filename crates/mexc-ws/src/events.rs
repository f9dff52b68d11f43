//! Connection and subscription lifecycle events

use crate::correlator::RequestId;

/// Information about an opened connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInfo {
    /// Endpoint URL (listen keys redacted)
    pub endpoint: String,
    /// True when this open repairs an unexpected loss within the same session
    pub is_reconnection: bool,
}

/// Reason for disconnection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Server closed the connection
    ServerClosed,
    /// Network or protocol error
    NetworkError(String),
    /// No frame received within the stale timeout
    HeartbeatTimeout,
    /// Closed because no subscriptions remain
    Idle,
    /// Client requested shutdown
    Shutdown,
}

impl DisconnectReason {
    /// Returns true if the driver will try to reconnect
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::ServerClosed | Self::NetworkError(_) | Self::HeartbeatTimeout
        )
    }
}

/// Outcome of a subscribe or unsubscribe command, as acknowledged by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// Subscribe acknowledged with code 0
    Subscribed { key: String, id: RequestId },
    /// Subscribe rejected
    Rejected { key: String, id: RequestId, code: i32 },
    /// Unsubscribe acknowledged; the record was removed
    Unsubscribed { key: String, id: RequestId },
    /// Unsubscribe rejected; the record is kept
    UnsubscribeRejected { key: String, id: RequestId, code: i32 },
}

impl SubscriptionEvent {
    /// Stream key the event refers to
    pub fn key(&self) -> &str {
        match self {
            Self::Subscribed { key, .. }
            | Self::Rejected { key, .. }
            | Self::Unsubscribed { key, .. }
            | Self::UnsubscribeRejected { key, .. } => key,
        }
    }

    /// Returns true if the server accepted the command
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Subscribed { .. } | Self::Unsubscribed { .. })
    }
}
