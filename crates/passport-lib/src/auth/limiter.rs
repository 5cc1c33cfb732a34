// ============================
// passport-lib/src/auth/limiter.rs
// ============================
//! Failed-login rate limiting over the TTL store.
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::cache::TtlStore;
use crate::config::LoginLimits;

fn failure_key(client_ip: &str) -> String {
    format!("access_num_{client_ip}")
}

/// Per-IP failed-login counter with a sliding expiry window
///
/// First failure creates the counter with the lockout window as TTL; every
/// further failure increments it and resets the window. Once the counter
/// reaches the threshold, logins from that IP are rejected up front until
/// the window elapses and the counter expires away.
pub struct LoginLimiter {
    cache: Arc<dyn TtlStore>,
    max_failures: i64,
    window: Duration,
}

impl LoginLimiter {
    pub fn new(cache: Arc<dyn TtlStore>, limits: &LoginLimits) -> Self {
        Self {
            cache,
            max_failures: limits.max_failures,
            window: limits.lockout_window(),
        }
    }

    /// Whether logins from `client_ip` are currently locked out
    ///
    /// Store errors read as "no counter": the limiter fails open rather
    /// than locking everyone out while the store is down.
    pub async fn is_locked(&self, client_ip: &str) -> bool {
        match self.cache.get(&failure_key(client_ip)).await {
            Ok(Some(raw)) => match raw.parse::<i64>() {
                Ok(count) => count >= self.max_failures,
                Err(_) => {
                    warn!(client_ip, value = %raw, "failure counter is not an integer, ignoring");
                    false
                }
            },
            Ok(None) => false,
            Err(err) => {
                warn!(client_ip, error = %err, "failure counter read failed, allowing login");
                false
            }
        }
    }

    /// Count one failed login from `client_ip` and reset its window
    ///
    /// Counter updates never block the login outcome; failures are logged
    /// and swallowed.
    pub async fn record_failure(&self, client_ip: &str) {
        let key = failure_key(client_ip);
        match self.cache.incr(&key).await {
            Ok(count) => {
                if let Err(err) = self.cache.expire(&key, self.window).await {
                    warn!(client_ip, error = %err, "failed to reset lockout window");
                }
                if count >= self.max_failures {
                    warn!(client_ip, count, "login lockout engaged");
                }
            }
            Err(err) => {
                warn!(client_ip, error = %err, "failed to record login failure");
            }
        }
    }
}
