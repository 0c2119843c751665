//! Live socket accounting.
//!
//! # Responsibilities
//! - Hand out a process-unique ID per accepted socket
//! - Count live sockets on a `watch` channel so closers can await zero

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique socket identifier, shown as `conn-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Live socket counter shared by every clone.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    live: Arc<watch::Sender<u64>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        let (live, _) = watch::channel(0);
        Self {
            live: Arc::new(live),
        }
    }

    /// Count a socket until the returned guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        self.live.send_modify(|count| *count += 1);
        ConnectionGuard {
            live: Arc::clone(&self.live),
            id: ConnectionId::next(),
        }
    }

    pub fn active_count(&self) -> u64 {
        *self.live.borrow()
    }

    /// Resolve once no tracked socket is alive.
    pub async fn wait_for_idle(&self) {
        let mut live = self.live.subscribe();
        let _ = live.wait_for(|count| *count == 0).await;
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps one socket counted while alive.
#[derive(Debug)]
pub struct ConnectionGuard {
    live: Arc<watch::Sender<u64>>,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.live.send_modify(|count| *count = count.saturating_sub(1));
        tracing::trace!(connection_id = %self.id, "Socket released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ids_increase() {
        let tracker = ConnectionTracker::new();
        let first = tracker.track();
        let second = tracker.track();
        assert!(second.id() > first.id());
        assert!(first.id().to_string().starts_with("conn-"));
    }

    #[test]
    fn guards_are_counted_until_dropped() {
        let tracker = ConnectionTracker::new();
        let shared = tracker.clone();

        let first = tracker.track();
        let second = shared.track();
        assert_eq!(tracker.active_count(), 2);

        drop(first);
        assert_eq!(shared.active_count(), 1);
        drop(second);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn idle_tracker_resolves_immediately() {
        ConnectionTracker::new().wait_for_idle().await;
    }

    #[tokio::test]
    async fn waiter_wakes_when_last_guard_drops() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.wait_for_idle().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
