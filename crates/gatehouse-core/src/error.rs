// Error codes and the top-level library error.
//
// `ErrorCode` carries the user-visible message for each rejection the
// auth flows can produce. Internal faults go through `GatehouseError`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// User-visible rejection codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UserAlreadyExists,
    InvalidEmailOrPassword,
    InvalidEmail,
    PasswordTooShort,
    PasswordTooLong,
    SignupDisabled,
    LocalAuthDisabled,
    UnknownStrategy,
    StoreUnavailable,
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UserAlreadyExists => "That email is already taken",
            Self::InvalidEmailOrPassword => "Invalid email or password",
            Self::InvalidEmail => "Invalid email address",
            Self::PasswordTooShort => "Password is too short",
            Self::PasswordTooLong => "Password is too long",
            Self::SignupDisabled => "Sign up is disabled",
            Self::LocalAuthDisabled => "Email and password login is not enabled",
            Self::UnknownStrategy => "Unknown authentication strategy",
            Self::StoreUnavailable => "Identity store unavailable",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// Internal library error: configuration problems, store faults, crypto
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] crate::db::store::StoreError),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for gatehouse operations.
pub type Result<T> = std::result::Result<T, GatehouseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serde_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::InvalidEmailOrPassword).unwrap();
        assert_eq!(json, "\"INVALID_EMAIL_OR_PASSWORD\"");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::InvalidEmailOrPassword);
    }

    #[test]
    fn test_error_code_messages() {
        assert_eq!(
            ErrorCode::UserAlreadyExists.to_string(),
            "That email is already taken"
        );
        assert_eq!(
            ErrorCode::InvalidEmailOrPassword.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let err: GatehouseError =
            crate::db::store::StoreError::Unavailable("connection refused".into()).into();
        assert!(err.to_string().contains("connection refused"));
    }
}
