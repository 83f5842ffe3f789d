//! Statement ingestion error types.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during statement upload and import.
#[derive(Debug, Error)]
pub enum StatementError {
    // ========== Validation Errors ==========
    /// Statement period start is after period end.
    #[error("Statement period start {start} is after period end {end}")]
    InvalidPeriod {
        /// First day of the period.
        start: NaiveDate,
        /// Last day of the period.
        end: NaiveDate,
    },

    /// A balance amount has more than two decimal places.
    #[error("Amount {0} has more than two decimal places")]
    InvalidAmount(String),

    /// The statement file is empty or contains no transaction rows.
    #[error("Statement file contains no transaction rows")]
    EmptyFile,

    // ========== Parse Errors ==========
    /// The file could not be parsed into transaction rows.
    ///
    /// Import is all-or-nothing: this aborts the whole call with zero inserts.
    #[error("Failed to parse statement file: {0}")]
    Parse(String),

    // ========== State Errors ==========
    /// Referenced bank account does not exist.
    #[error("Bank account not found: {0}")]
    BankAccountNotFound(Uuid),

    /// Referenced statement does not exist.
    #[error("Statement not found: {0}")]
    StatementNotFound(Uuid),

    /// Transactions were already imported for this statement.
    #[error("Statement {0} is already processed; re-import is not allowed")]
    AlreadyProcessed(Uuid),

    /// A reconciliation references the statement, so it is immutable.
    #[error("Statement {0} is referenced by a reconciliation and cannot be re-imported")]
    StatementReferenced(Uuid),
}

impl StatementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::EmptyFile => "EMPTY_FILE",
            Self::Parse(_) => "PARSE_ERROR",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::AlreadyProcessed(_) => "STATEMENT_ALREADY_PROCESSED",
            Self::StatementReferenced(_) => "STATEMENT_REFERENCED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidPeriod { .. } | Self::InvalidAmount(_) | Self::EmptyFile => 400,

            Self::Parse(_) => 422,

            Self::BankAccountNotFound(_) | Self::StatementNotFound(_) => 404,

            Self::AlreadyProcessed(_) | Self::StatementReferenced(_) => 409,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StatementError::Parse("bad row".into()).error_code(),
            "PARSE_ERROR"
        );
        assert_eq!(
            StatementError::AlreadyProcessed(Uuid::nil()).error_code(),
            "STATEMENT_ALREADY_PROCESSED"
        );
        assert_eq!(StatementError::EmptyFile.error_code(), "EMPTY_FILE");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            StatementError::InvalidPeriod {
                start: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            }
            .http_status_code(),
            400
        );
        assert_eq!(StatementError::Parse("x".into()).http_status_code(), 422);
        assert_eq!(
            StatementError::BankAccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            StatementError::StatementReferenced(Uuid::nil()).http_status_code(),
            409
        );
    }

    #[test]
    fn test_error_display() {
        let err = StatementError::InvalidPeriod {
            start: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Statement period start 2026-02-01 is after period end 2026-01-31"
        );
    }
}
