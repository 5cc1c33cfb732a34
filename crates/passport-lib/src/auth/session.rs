// ============================
// passport-lib/src/auth/session.rs
// ============================
//! Server-side session state keyed by opaque token.
use std::{collections::HashMap, sync::Arc, time::Duration};

use metrics::{counter, gauge};
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_EXPIRED};

/// Authenticated-identity attributes held by a session
#[derive(Clone, Debug)]
pub struct SessionData {
    pub name: String,
    pub mobile: String,
    pub user_id: Uuid,
    expires_at: Instant,
}

impl SessionData {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Session store for authenticated identities
///
/// Tokens are opaque; their lifecycle (cookie handling) belongs to the HTTP
/// layer. Entries expire after the configured TTL and a background task
/// sweeps them out periodically.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a new session store and spawn its cleanup task
    pub fn new(ttl: Duration) -> Self {
        let store = SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let store_clone = store.clone();
        tokio::spawn(async move {
            store_clone.cleanup_task().await;
        });

        store
    }

    /// Open a per-request handle onto the session for `token`
    pub fn handle(&self, token: impl Into<String>) -> SessionHandle {
        SessionHandle {
            store: self.clone(),
            token: token.into(),
        }
    }

    /// Mint a fresh opaque session token
    pub fn mint_token() -> String {
        Uuid::new_v4().to_string()
    }

    async fn get(&self, token: &str) -> Option<SessionData> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;
        if session.is_expired(Instant::now()) {
            return None;
        }
        Some(session.clone())
    }

    async fn set(&self, token: &str, name: String, mobile: String, user_id: Uuid) {
        let data = SessionData {
            name,
            mobile,
            user_id,
            expires_at: Instant::now() + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.to_string(), data);

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
    }

    async fn clear(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
    }

    /// Cleanup task that runs periodically to remove expired sessions
    async fn cleanup_task(&self) {
        let cleanup_interval = Duration::from_secs(60 * 60);

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let mut sessions = self.sessions.write().await;
            let now = Instant::now();
            let before_count = sessions.len();

            sessions.retain(|_, session| !session.is_expired(now));

            let removed = before_count - sessions.len();
            if removed > 0 {
                counter!(SESSION_EXPIRED).increment(removed as u64);
                gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
            }
        }
    }
}

/// Per-request capability over one session
///
/// Handlers construct a handle from the request's token and pass it to the
/// auth service; the service never sees the token lifecycle.
pub struct SessionHandle {
    store: SessionStore,
    token: String,
}

impl SessionHandle {
    /// The opaque token this handle is bound to
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Read the session attributes, if the session is live
    pub async fn get(&self) -> Option<SessionData> {
        self.store.get(&self.token).await
    }

    /// Write the authenticated identity into the session
    pub async fn set(&self, name: String, mobile: String, user_id: Uuid) {
        self.store.set(&self.token, name, mobile, user_id).await;
    }

    /// Drop all session attributes; absent sessions clear to a no-op
    pub async fn clear(&self) {
        self.store.clear(&self.token).await;
    }
}
