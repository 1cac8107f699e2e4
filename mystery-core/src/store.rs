//! In-memory session store.
//!
//! Owns creation and lookup of session state. Each session sits behind
//! its own async mutex so at most one action is in flight per session,
//! while different sessions proceed independently. The store is
//! capacity-bounded: inserting past capacity evicts the
//! least-recently-active session.

use crate::session::{SessionId, SessionState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

/// Default ceiling on concurrently retained sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct SessionSlot {
    state: Arc<Mutex<SessionState>>,
    /// Coarse activity stamp in seconds since store creation. Atomic
    /// so eviction scans never need a session's action lock.
    last_active: Arc<AtomicU64>,
}

/// A checked-out session: the state lock plus its activity stamp.
pub struct SessionHandle {
    pub state: Arc<Mutex<SessionState>>,
    last_active: Arc<AtomicU64>,
    epoch: Instant,
}

impl SessionHandle {
    /// Mark the session as active now.
    pub fn touch(&self) {
        self.last_active
            .store(self.epoch.elapsed().as_secs(), Ordering::Relaxed);
    }
}

/// In-memory mapping from session id to session state.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
    max_sessions: usize,
    epoch: Instant,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            epoch: Instant::now(),
        }
    }

    /// Insert a new session, evicting the least-recently-active one if
    /// the store is at capacity.
    pub fn insert(&self, state: SessionState) {
        let id = state.id;
        let now = self.epoch.elapsed().as_secs();
        let mut sessions = self.sessions.write().expect("session store lock poisoned");

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_active.load(Ordering::Relaxed))
                .map(|(id, _)| *id);
            if let Some(evicted) = oldest {
                sessions.remove(&evicted);
                info!(session = %evicted, "evicted idle session at capacity");
            }
        }

        sessions.insert(
            id,
            SessionSlot {
                state: Arc::new(Mutex::new(state)),
                last_active: Arc::new(AtomicU64::new(now)),
            },
        );
    }

    /// Check out a session by id.
    pub fn get(&self, id: SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.get(&id).map(|slot| SessionHandle {
            state: Arc::clone(&slot.state),
            last_active: Arc::clone(&slot.last_active),
            epoch: self.epoch,
        })
    }

    /// Number of retained sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().expect("session store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::hogwarts_catalog;

    fn fresh_state() -> SessionState {
        SessionState::new(SessionId::new(), &hogwarts_catalog())
    }

    #[test]
    fn test_insert_and_get() {
        let store = SessionStore::new(8);
        let state = fresh_state();
        let id = state.id;

        store.insert(state);
        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_some());
        assert!(store.get(SessionId::new()).is_none());
    }

    #[test]
    fn test_capacity_eviction_drops_least_active() {
        let store = SessionStore::new(2);

        let first = fresh_state();
        let first_id = first.id;
        store.insert(first);

        let second = fresh_state();
        let second_id = second.id;
        store.insert(second);

        // Touch the first session so the second becomes the eviction
        // candidate. Stamps are whole seconds, so force an ordering
        // directly.
        store.get(first_id).unwrap().last_active.store(10, Ordering::Relaxed);

        let third = fresh_state();
        let third_id = third.id;
        store.insert(third);

        assert_eq!(store.len(), 2);
        assert!(store.get(first_id).is_some());
        assert!(store.get(second_id).is_none());
        assert!(store.get(third_id).is_some());
    }

    #[tokio::test]
    async fn test_handle_locks_state() {
        let store = SessionStore::new(8);
        let state = fresh_state();
        let id = state.id;
        store.insert(state);

        let handle = store.get(id).unwrap();
        let guard = handle.state.lock().await;

        // A second checkout sees the same session but cannot lock it.
        let other = store.get(id).unwrap();
        assert!(other.state.try_lock().is_err());
        drop(guard);
        assert!(other.state.try_lock().is_ok());
    }
}
