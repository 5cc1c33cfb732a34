// ============================
// passport-lib/src/auth/service.rs
// ============================
//! The authentication state machine: registration, login, session checks.
use std::sync::Arc;

use metrics::counter;
use tracing::{error, info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{LoginLimiter, SessionHandle};
use crate::cache::TtlStore;
use crate::config::LoginLimits;
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILURE, LOGIN_SUCCESS, LOGIN_THROTTLED, LOGOUT, USER_REGISTERED};
use crate::users::{NewUser, RepoError, UserRepository};
use crate::validation::{self, ValidationError};

fn sms_code_key(mobile: &str) -> String {
    format!("sms_codes_{mobile}")
}

/// Orchestrates registration and login against the injected collaborators
///
/// The service holds no mutable state of its own; everything shared lives in
/// the TTL store and the repository, which bring their own atomicity.
pub struct AuthService {
    cache: Arc<dyn TtlStore>,
    users: Arc<dyn UserRepository>,
    limiter: LoginLimiter,
}

impl AuthService {
    pub fn new(
        cache: Arc<dyn TtlStore>,
        users: Arc<dyn UserRepository>,
        limits: &LoginLimits,
    ) -> Self {
        let limiter = LoginLimiter::new(Arc::clone(&cache), limits);
        Self {
            cache,
            users,
            limiter,
        }
    }

    /// Register a new account after verifying the one-time SMS code
    ///
    /// The stored code is consumed (deleted) as soon as it has been read, so
    /// a retried call fails on the missing code rather than reusing it.
    pub async fn register(
        &self,
        mobile: &str,
        sms_code: &str,
        password: &str,
        password2: &str,
        session: &SessionHandle,
    ) -> Result<(), AppError> {
        validation::require_all(&[mobile, sms_code, password, password2])?;
        validation::validate_mobile(mobile)?;
        if password != password2 {
            return Err(ValidationError::PasswordMismatch.into());
        }

        let key = sms_code_key(mobile);
        let stored_code = match self.cache.get(&key).await {
            Ok(code) => code,
            Err(err) => {
                error!(mobile, error = %err, "failed to read SMS code from store");
                return Err(err.into());
            }
        };
        let Some(stored_code) = stored_code else {
            return Err(AppError::SmsCodeExpired);
        };

        // Consume the code before comparing so neither outcome can reuse it.
        if let Err(err) = self.cache.delete(&key).await {
            warn!(mobile, error = %err, "failed to delete consumed SMS code");
        }

        if stored_code != sms_code {
            return Err(ValidationError::BadSmsCode.into());
        }

        let password_hash =
            hash_password(password2).map_err(|err| AppError::Internal(err.to_string()))?;
        let new_user = NewUser {
            name: mobile.to_string(),
            mobile: mobile.to_string(),
            password_hash,
        };

        let user = match self.users.insert(new_user).await {
            Ok(user) => user,
            Err(RepoError::Duplicate) => return Err(AppError::MobileExists),
            Err(err) => {
                error!(mobile, error = %err, "failed to persist new user");
                return Err(err.into());
            }
        };

        session.set(user.name, user.mobile, user.id).await;
        counter!(USER_REGISTERED).increment(1);
        info!(mobile, "user registered");
        Ok(())
    }

    /// Log a user in, counting failures per client IP
    pub async fn login(
        &self,
        mobile: &str,
        password: &str,
        client_ip: &str,
        session: &SessionHandle,
    ) -> Result<(), AppError> {
        validation::require_all(&[mobile, password])?;
        validation::validate_mobile(mobile)?;

        if self.limiter.is_locked(client_ip).await {
            counter!(LOGIN_THROTTLED).increment(1);
            return Err(AppError::Throttled);
        }

        let user = match self.users.find_by_mobile(mobile).await {
            Ok(user) => user,
            Err(err) => {
                error!(mobile, error = %err, "failed to look up user");
                return Err(err.into());
            }
        };

        // An unknown mobile takes the same failure branch as a wrong
        // password; the response does not reveal whether the account exists.
        if let Some(user) = user {
            if verify_password(&user.password_hash, password) {
                session.set(user.name, user.mobile, user.id).await;
                counter!(LOGIN_SUCCESS).increment(1);
                return Ok(());
            }
        }

        self.limiter.record_failure(client_ip).await;
        counter!(LOGIN_FAILURE).increment(1);
        Err(ValidationError::BadCredentials.into())
    }

    /// Return the logged-in user's name, if any
    pub async fn check_session(&self, session: &SessionHandle) -> Result<String, AppError> {
        session
            .get()
            .await
            .map(|data| data.name)
            .ok_or(AppError::NotAuthenticated)
    }

    /// Clear the session; succeeds whether or not one was live
    pub async fn logout(&self, session: &SessionHandle) {
        session.clear().await;
        counter!(LOGOUT).increment(1);
    }
}
