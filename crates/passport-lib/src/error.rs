// ============================
// passport-lib/src/error.rs
// ============================
//! Central error type + Axum integration.
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use homestay_common::{errno, ApiResponse, Empty};
use thiserror::Error;

use crate::cache::StoreError;
use crate::users::RepoError;
use crate::validation::ValidationError;

/// Application error types, one variant per response kind
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("SMS verification code expired")]
    SmsCodeExpired,

    #[error("mobile number already registered")]
    MobileExists,

    #[error("too many failed logins, try again later")]
    Throttled,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the wire-level response code for this error
    pub fn errno(&self) -> &'static str {
        match self {
            AppError::Validation(
                ValidationError::Incomplete
                | ValidationError::BadMobileFormat
                | ValidationError::PasswordMismatch,
            ) => errno::PARAM_ERR,
            AppError::Validation(
                ValidationError::BadSmsCode | ValidationError::BadCredentials,
            ) => errno::DATA_ERR,
            AppError::SmsCodeExpired => errno::NO_DATA,
            AppError::MobileExists => errno::DATA_EXIST,
            AppError::Throttled => errno::REQ_ERR,
            AppError::NotAuthenticated => errno::SESSION_ERR,
            AppError::Store(_) => errno::DB_ERR,
            AppError::Internal(_) => errno::SERVER_ERR,
        }
    }

    /// Get a message suitable for the response body
    ///
    /// Infrastructure errors carry internal detail in their `Display` form;
    /// only a generic message crosses the wire.
    pub fn errmsg(&self) -> String {
        match self {
            AppError::Store(_) => "database access error".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate => AppError::MobileExists,
            RepoError::Unavailable(detail) => AppError::Store(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The wire contract pins every passport outcome to HTTP 200; errno
        // distinguishes the kinds.
        let body: ApiResponse<Empty> = ApiResponse::err(self.errno(), self.errmsg());
        Json(body).into_response()
    }
}
