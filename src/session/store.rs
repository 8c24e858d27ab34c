use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

struct SessionEntry {
    data: String,
    last_seen: Instant,
}

/// Volatile, process-local session storage keyed by opaque session id.
///
/// Each load or save takes the lock briefly; nothing is held across a
/// generation, so concurrent turns on one session may overwrite each other.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    idle_ttl: Option<Duration>,
}

impl SessionStore {
    /// `idle_ttl` of `None` keeps sessions until the process exits.
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Serialized state for `id`, refreshing its idle timer.
    pub async fn load(&self, id: &str) -> Option<String> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(id)?;
        if self.is_expired(entry) {
            sessions.remove(id);
            tracing::debug!("Session {} expired", id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.data.clone())
    }

    pub async fn save(&self, id: &str, data: String) {
        let mut sessions = self.inner.write().await;
        sessions.insert(
            id.to_string(),
            SessionEntry {
                data,
                last_seen: Instant::now(),
            },
        );
    }

    /// Returns whether a session was actually removed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut sessions = self.inner.write().await;
        sessions.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        let sessions = self.inner.read().await;
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        if self.idle_ttl.is_none() {
            return 0;
        }
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry));
        before - sessions.len()
    }

    /// Periodically purges expired sessions for the life of the process.
    pub fn spawn_sweeper(&self, interval: Duration) -> Option<tokio::task::JoinHandle<()>> {
        self.idle_ttl?;
        let store = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    tracing::info!("Purged {} idle sessions", purged);
                }
            }
        }))
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        self.idle_ttl
            .map(|ttl| entry.last_seen.elapsed() >= ttl)
            .unwrap_or(false)
    }
}
