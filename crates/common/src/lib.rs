// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the `HomeStay` web client and the passport
//! service. This module defines the JSON request payloads, the response
//! envelope, and the errno code table.

use serde::{Deserialize, Serialize};

/// Response codes carried in the `errno` field of every passport response.
///
/// The values follow the service's historical response-code table; clients
/// switch on them, so they are part of the wire contract.
pub mod errno {
    /// Success
    pub const OK: &str = "0";
    /// Database or key-value store unreachable/erroring
    pub const DB_ERR: &str = "4001";
    /// Requested data missing or expired (e.g. SMS code)
    pub const NO_DATA: &str = "4002";
    /// Data already exists (duplicate mobile)
    pub const DATA_EXIST: &str = "4003";
    /// Data wrong (bad SMS code, bad credentials)
    pub const DATA_ERR: &str = "4004";
    /// Not authenticated
    pub const SESSION_ERR: &str = "4101";
    /// Parameter missing or malformed
    pub const PARAM_ERR: &str = "4103";
    /// Too many requests (login lockout)
    pub const REQ_ERR: &str = "4201";
    /// Unexpected server error
    pub const SERVER_ERR: &str = "4500";
}

/// Registration request body for `POST /api/v1.0/users`
/// # Fields
/// * `mobile` - 11-digit mobile number, becomes the account identity
/// * `sms_code` - one-time SMS verification code
/// * `password` - chosen password
/// * `password2` - password confirmation, must match `password`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterPayload {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub sms_code: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

/// Login request body for `POST /api/v1.0/session`
/// # Fields
/// * `mobile` - registered mobile number
/// * `password` - account password
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginPayload {
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticated-user data returned by `GET /api/v1.0/session`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionUser {
    /// Display name of the logged-in user
    pub name: String,
}

/// Envelope wrapping every passport response
///
/// All outcomes ship with HTTP 200; `errno` distinguishes success from the
/// individual failure kinds.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    /// Response code, `"0"` on success
    pub errno: String,
    /// Human-readable message
    pub errmsg: String,
    /// Optional payload, present on data-carrying successes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Build a success envelope without a payload
    pub fn ok(errmsg: impl Into<String>) -> Self {
        Self {
            errno: errno::OK.to_string(),
            errmsg: errmsg.into(),
            data: None,
        }
    }

    /// Build a success envelope carrying `data`
    pub fn ok_with(errmsg: impl Into<String>, data: T) -> Self {
        Self {
            errno: errno::OK.to_string(),
            errmsg: errmsg.into(),
            data: Some(data),
        }
    }

    /// Build a failure envelope
    pub fn err(errno: &str, errmsg: impl Into<String>) -> Self {
        Self {
            errno: errno.to_string(),
            errmsg: errmsg.into(),
            data: None,
        }
    }
}

/// Placeholder payload type for envelopes that never carry data
pub type Empty = serde_json::Value;
