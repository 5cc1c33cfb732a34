// ============================
// passport-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Session settings
    pub session: SessionSettings,
    /// Login failure limits
    pub login: LoginLimits,
}

/// Server-side session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
    /// Session TTL in seconds
    pub ttl_secs: u64,
}

/// Failed-login lockout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginLimits {
    /// Failed attempts from one IP before logins are rejected
    pub max_failures: i64,
    /// Lockout window in seconds; the window resets on every failure
    pub lockout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            session: SessionSettings::default(),
            login: LoginLimits::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            ttl_secs: 60 * 60 * 24, // 1 day
        }
    }
}

impl Default for LoginLimits {
    fn default() -> Self {
        Self {
            max_failures: 5,
            lockout_secs: 600,
        }
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl LoginLimits {
    pub fn lockout_window(&self) -> Duration {
        Duration::from_secs(self.lockout_secs)
    }
}

impl Settings {
    /// Load settings from `config.toml` and `HOMESTAY_`-prefixed environment
    /// variables, on top of the built-in defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings with an explicit config file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("HOMESTAY_").split("__"))
            .extract()?;

        Ok(settings)
    }
}
