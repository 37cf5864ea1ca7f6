//! In-memory session repository with per-session locks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::model::Session;

/// Exclusive access to one session. Holding the lock serializes every
/// mutation of that session's intake state.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Backend-agnostic session repository.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Snapshot of a session, if it exists.
    async fn get(&self, id: &str) -> Option<Session>;

    /// Insert a fresh session, replacing any existing one with the same id.
    async fn create(&self, id: &str) -> SessionHandle;

    /// Existing session handle, or a fresh one if the id is unseen.
    async fn get_or_create(&self, id: &str) -> SessionHandle;

    /// Drop a session. Returns whether it existed.
    async fn remove(&self, id: &str) -> bool;

    /// Evict sessions idle longer than `max_idle` at `now`. Sessions a request
    /// currently holds a handle to are skipped. Returns the number evicted.
    async fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    /// Whether there are no live sessions.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-local session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    async fn get(&self, id: &str) -> Option<Session> {
        let handle = self.sessions.read().await.get(id).cloned()?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    async fn create(&self, id: &str) -> SessionHandle {
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions
            .write()
            .await
            .insert(id.to_string(), Arc::clone(&handle));
        info!(session_id = %id, "Session created");
        handle
    }

    async fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(id) {
            return Arc::clone(handle);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have created it between the two locks.
        if let Some(handle) = sessions.get(id) {
            return Arc::clone(handle);
        }
        let handle = Arc::new(Mutex::new(Session::new(id)));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        info!(session_id = %id, "Session created");
        handle
    }

    async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn evict_idle(&self, now: DateTime<Utc>, max_idle: Duration) -> usize {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, handle| {
            // A request holding a handle from `get_or_create` may not have
            // locked it yet.
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => {
                    let idle = session.is_idle(now, max_idle);
                    if idle {
                        debug!(session_id = %id, step = session.intake.step(), "Session evicted");
                    }
                    !idle
                }
                // In use by a request right now.
                Err(_) => true,
            }
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(count = evicted, "Evicted idle sessions");
        }
        evicted
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Spawn a background task that periodically evicts idle sessions.
pub fn spawn_eviction_task(
    store: Arc<dyn SessionRepository>,
    max_idle: Duration,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            store.evict_idle(Utc::now(), max_idle).await;
        }
    })
}
