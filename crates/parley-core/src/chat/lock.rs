//! Per-session mutation locks.
//!
//! The store offers last-writer-wins at session granularity, so two
//! overlapping read-modify-write cycles on one session would drop a turn.
//! `SessionLocks` hands out one async mutex per session id; holders of the
//! guard have exclusive write access to that session.
//!
//! Entries are created on first mutation and removed only by `forget`
//! (called on delete), so the map holds one small mutex per live session
//! mutated since startup.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Guard returned by [`SessionLocks::acquire`]. Dropping it releases the session.
pub type SessionGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`.
    ///
    /// Sessions are independent: waiting on one id never blocks another.
    pub async fn acquire(&self, id: Uuid) -> SessionGuard {
        // Clone the Arc out so the shard lock is released before awaiting.
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry for a deleted session.
    pub fn forget(&self, id: &Uuid) {
        self.locks.remove(id);
    }

    /// Number of sessions with a lock entry.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_exclusive() {
        let locks = SessionLocks::new();
        let id = Uuid::now_v7();

        let guard = locks.acquire(id).await;
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(second.is_err(), "second acquire should wait while the first is held");

        drop(guard);
        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire(Uuid::now_v7()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::now_v7())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_forget_removes_entry() {
        let locks = SessionLocks::new();
        let id = Uuid::now_v7();
        drop(locks.acquire(id).await);
        assert_eq!(locks.len(), 1);
        locks.forget(&id);
        assert!(locks.is_empty());
    }
}
