//! Request id allocation for control commands

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Id of a subscribe or unsubscribe command, echoed in its acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u32);

impl RequestId {
    /// Raw id as sent on the wire
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-client monotonic id counter
///
/// Ids start at 1 and are never reused for the lifetime of the counter.
#[derive(Debug, Default)]
pub struct RequestIds {
    last: AtomicU32,
}

impl RequestIds {
    /// Create a new counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id
    pub fn next_id(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Last id handed out (0 if none)
    pub fn last(&self) -> u32 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_start_above_zero() {
        let ids = RequestIds::new();
        assert_eq!(ids.last(), 0);
        assert_eq!(ids.next_id(), RequestId(1));
        assert_eq!(ids.next_id(), RequestId(2));
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = RequestIds::new();
        let b = RequestIds::new();
        a.next_id();
        a.next_id();
        assert_eq!(b.next_id(), RequestId(1));
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(RequestIds::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..1000).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 8000);
        assert_eq!(ids.last(), 8000);
    }
}
