// ============================
// passport-lib/src/lib.rs
// ============================
//! Core library for the `HomeStay` passport (user authentication) service.

pub mod cache;
pub mod config;
pub mod error;
pub mod users;
pub mod auth;
pub mod validation;
pub mod handlers;
pub mod router;
pub mod metrics;

use std::sync::Arc;

use crate::auth::{AuthService, SessionStore};
use crate::cache::TtlStore;
use crate::config::Settings;
use crate::users::UserRepository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Server-side session store
    pub sessions: SessionStore,
    /// Settings manager
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state
    ///
    /// The TTL store and user repository are the external collaborators of
    /// the service; callers inject whichever implementation backs their
    /// deployment.
    pub fn new(
        cache: Arc<dyn TtlStore>,
        users: Arc<dyn UserRepository>,
        settings: Settings,
    ) -> Self {
        let sessions = SessionStore::new(settings.session.ttl());
        let auth = Arc::new(AuthService::new(cache, users, &settings.login));

        Self {
            auth,
            sessions,
            settings: Arc::new(settings),
        }
    }
}
