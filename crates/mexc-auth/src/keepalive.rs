//! Periodic listen key extension

use crate::listen_key::ListenKeyStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Default period between extensions
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Background task extending every active listen key
///
/// The first round runs immediately. Failures are logged and retried on the
/// next tick. The task stops on [`stop`](Self::stop) or when dropped.
#[derive(Debug)]
pub struct KeepAlive {
    handle: JoinHandle<()>,
}

impl KeepAlive {
    /// Spawn with [`DEFAULT_KEEP_ALIVE_INTERVAL`]
    pub fn spawn<S>(store: Arc<S>) -> Self
    where
        S: ListenKeyStore + ?Sized + 'static,
    {
        Self::spawn_every(store, DEFAULT_KEEP_ALIVE_INTERVAL)
    }

    /// Spawn with a custom period
    pub fn spawn_every<S>(store: Arc<S>, period: Duration) -> Self
    where
        S: ListenKeyStore + ?Sized + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                extend_all(store.as_ref()).await;
            }
        });
        Self { handle }
    }

    /// Stop extending keys
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Returns true once the task has stopped
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for KeepAlive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn extend_all<S: ListenKeyStore + ?Sized>(store: &S) {
    let keys = match store.listen_keys().await {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Failed to list listen keys: {}", e);
            return;
        }
    };

    for key in keys {
        match store.keep_alive(&key).await {
            Ok(_) => debug!("Listen key extended"),
            Err(e) => warn!("Failed to extend listen key: {}", e),
        }
    }
}
