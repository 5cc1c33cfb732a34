// ============================
// passport-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Mobiles are fixed at 11 digits: leading 1, second digit in {3,4,5,7,8},
// then nine more digits.
static MOBILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^1[34578]\d{9}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("incomplete parameters")]
    Incomplete,

    #[error("malformed mobile number")]
    BadMobileFormat,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("wrong SMS verification code")]
    BadSmsCode,

    #[error("wrong mobile number or password")]
    BadCredentials,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Require that every field is non-empty
pub fn require_all(fields: &[&str]) -> ValidationResult<()> {
    if fields.iter().any(|field| field.is_empty()) {
        return Err(ValidationError::Incomplete);
    }
    Ok(())
}

/// Validate a mobile number
pub fn validate_mobile(mobile: &str) -> ValidationResult<&str> {
    if !MOBILE_REGEX.is_match(mobile) {
        return Err(ValidationError::BadMobileFormat);
    }
    Ok(mobile)
}
