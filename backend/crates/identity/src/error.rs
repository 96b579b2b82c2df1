//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed input to a creation or update operation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Provider name that is not part of the registry (raw input preserved)
    #[error("Invalid provider: {0}")]
    UnknownProvider(String),

    /// Attribute map could not be serialized
    #[error("Could not convert attributes to JSON: {0}")]
    Encoding(String),

    /// Attribute column could not be deserialized
    #[error("Could not convert JSON to attributes: {0}")]
    Decoding(String),

    /// Duplicate email or token string, or a stale aggregate version
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence collaborator could not be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Email already belongs to another account
    #[error("Email is already registered")]
    EmailTaken,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Bearer value is unknown
    #[error("Token not found")]
    TokenNotFound,

    /// Token is revoked or expired
    #[error("Token is revoked or expired")]
    TokenInvalid,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Validation(_) | IdentityError::Decoding(_) => ErrorKind::BadRequest,
            IdentityError::UnknownProvider(_)
            | IdentityError::TokenNotFound
            | IdentityError::TokenInvalid => ErrorKind::Unauthorized,
            IdentityError::AccountDisabled => ErrorKind::Forbidden,
            IdentityError::NotFound(_) | IdentityError::UserNotFound => ErrorKind::NotFound,
            IdentityError::Conflict(_) | IdentityError::EmailTaken => ErrorKind::Conflict,
            IdentityError::Encoding(_) => ErrorKind::UnprocessableEntity,
            IdentityError::StorageUnavailable(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Machine-readable code for errors callers need to tell apart
    pub fn code(&self) -> Option<&'static str> {
        match self {
            IdentityError::UnknownProvider(_) => Some("invalid_provider"),
            IdentityError::TokenInvalid | IdentityError::TokenNotFound => Some("invalid_token"),
            IdentityError::AccountDisabled => Some("account_disabled"),
            IdentityError::EmailTaken => Some("email_taken"),
            _ => None,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self.code() {
            Some(code) => err.with_code(code),
            None => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            IdentityError::StorageUnavailable(msg) => {
                tracing::error!(message = %msg, "Identity storage unavailable");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::Encoding(msg) | IdentityError::Decoding(msg) => {
                tracing::error!(message = %msg, "Attribute conversion failed");
            }
            IdentityError::UnknownProvider(raw) => {
                tracing::warn!(provider = %raw, "Sign-in with unknown provider");
            }
            IdentityError::TokenInvalid => {
                tracing::warn!("Revoked or expired token presented");
            }
            IdentityError::AccountDisabled => {
                tracing::warn!("Access attempt on disabled account");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        err.to_app_error()
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        let app_err = AppError::from(err);
        let message = app_err.message().to_string();
        match app_err.kind() {
            ErrorKind::Conflict => IdentityError::Conflict(message),
            ErrorKind::NotFound => IdentityError::NotFound(message),
            ErrorKind::ServiceUnavailable => IdentityError::StorageUnavailable(message),
            ErrorKind::BadRequest => IdentityError::Validation(message),
            _ => IdentityError::Internal(app_err.to_string()),
        }
    }
}
