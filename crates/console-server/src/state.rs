//! Application state

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use fixit_core::backend::Backend;

use crate::session::ConsoleSession;

pub type SharedSession = Arc<Mutex<ConsoleSession>>;

/// A registered session and the expiry of the token that names it.
struct SessionEntry {
    session: SharedSession,
    expires_at: usize,
}

impl SessionEntry {
    fn is_expired(&self, now: usize) -> bool {
        self.expires_at <= now
    }
}

fn now_secs() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    backend: Arc<dyn Backend>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    auth_timeout: Duration,
    session_secret: String,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn Backend>,
        auth_timeout: Duration,
        session_secret: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                backend,
                sessions: RwLock::new(HashMap::new()),
                auth_timeout,
                session_secret: session_secret.into(),
            }),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    pub fn auth_timeout(&self) -> Duration {
        self.inner.auth_timeout
    }

    pub fn session_secret(&self) -> &str {
        &self.inner.session_secret
    }

    /// Open a fresh backend connection for a new browser session.
    pub fn new_session(&self) -> ConsoleSession {
        ConsoleSession::new(&self.inner.backend.connect())
    }

    /// Register a session under `id` until `expires_at` (unix seconds).
    /// Sessions whose token has expired are dropped on the way.
    pub async fn register_session(&self, id: Uuid, session: ConsoleSession, expires_at: usize) {
        let mut sessions = self.inner.sessions.write().await;
        let now = now_secs();
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        if sessions.len() < before {
            info!(expired = before - sessions.len(), "Dropped expired console sessions");
        }
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                expires_at,
            },
        );
        info!(session_id = %id, "Console session opened");
    }

    pub async fn session(&self, id: Uuid) -> Option<SharedSession> {
        let now = now_secs();
        {
            let sessions = self.inner.sessions.read().await;
            match sessions.get(&id) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(Arc::clone(&entry.session)),
                Some(_) => {}
            }
        }
        self.remove_session(id).await;
        None
    }

    pub async fn remove_session(&self, id: Uuid) -> Option<SharedSession> {
        let removed = self.inner.sessions.write().await.remove(&id);
        if removed.is_some() {
            info!(session_id = %id, "Console session closed");
        }
        removed.map(|entry| entry.session)
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fixit_core::backend::MemoryBackend;

    use super::*;

    fn state() -> AppState {
        AppState::new(Arc::new(MemoryBackend::new()), Duration::from_secs(1), "secret")
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped_on_lookup() {
        let state = state();
        let id = Uuid::new_v4();
        state
            .register_session(id, state.new_session(), now_secs().saturating_sub(1))
            .await;
        assert_eq!(state.session_count().await, 1);

        assert!(state.session(id).await.is_none());
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_registration_sweeps_expired_sessions() {
        let state = state();
        let stale = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        state
            .register_session(stale, state.new_session(), now_secs().saturating_sub(1))
            .await;
        state
            .register_session(fresh, state.new_session(), now_secs() + 3600)
            .await;

        assert_eq!(state.session_count().await, 1);
        assert!(state.session(fresh).await.is_some());
    }
}
