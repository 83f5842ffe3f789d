//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// One variant per error kind the reconciliation workflow can surface to a
/// caller. Business-rule violations are recovered at the component boundary
/// and mapped into these; only persistence failures stay opaque.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed required input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uploaded statement file cannot be parsed into transaction rows.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A match was attempted on a side that is already matched.
    #[error("Already matched: {0}")]
    AlreadyMatched(String),

    /// A mutation was attempted on a closed reconciliation session.
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// Conflicting state (e.g., open reconciliation already exists).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Parse(_) => 422,
            Self::AlreadyMatched(_) | Self::SessionClosed(_) | Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Parse(_) => "PARSE_ERROR",
            Self::AlreadyMatched(_) => "ALREADY_MATCHED",
            Self::SessionClosed(_) => "SESSION_CLOSED",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the operation as-is.
    ///
    /// Only persistence failures are retryable; everything else requires the
    /// caller to change the request or re-fetch current state first.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Parse(String::new()).status_code(), 422);
        assert_eq!(AppError::AlreadyMatched(String::new()).status_code(), 409);
        assert_eq!(AppError::SessionClosed(String::new()).status_code(), 409);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(AppError::Parse(String::new()).error_code(), "PARSE_ERROR");
        assert_eq!(
            AppError::AlreadyMatched(String::new()).error_code(),
            "ALREADY_MATCHED"
        );
        assert_eq!(
            AppError::SessionClosed(String::new()).error_code(),
            "SESSION_CLOSED"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::NotFound("msg".into()).to_string(),
            "Not found: msg"
        );
        assert_eq!(AppError::Parse("msg".into()).to_string(), "Parse error: msg");
        assert_eq!(
            AppError::AlreadyMatched("msg".into()).to_string(),
            "Already matched: msg"
        );
        assert_eq!(
            AppError::SessionClosed("msg".into()).to_string(),
            "Session closed: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(AppError::Database(String::new()).is_retryable());
        assert!(!AppError::Validation(String::new()).is_retryable());
        assert!(!AppError::AlreadyMatched(String::new()).is_retryable());
        assert!(!AppError::SessionClosed(String::new()).is_retryable());
    }
}
