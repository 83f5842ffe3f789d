//! Reconciliation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors from reconciliation session operations.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// Reconciliation session not found.
    #[error("reconciliation not found: {0}")]
    NotFound(Uuid),

    /// Statement not found.
    #[error("statement not found: {0}")]
    StatementNotFound(Uuid),

    /// Bank account not found.
    #[error("bank account not found: {0}")]
    BankAccountNotFound(Uuid),

    /// Statement transaction not found within the session's statement.
    #[error("statement transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Ledger line not found within the session's bank account.
    #[error("ledger line not found: {0}")]
    LedgerLineNotFound(Uuid),

    /// Statement belongs to a different bank account.
    #[error("statement {statement_id} does not belong to bank account {bank_account_id}")]
    StatementAccountMismatch {
        /// The statement named in the request.
        statement_id: Uuid,
        /// The account named in the request.
        bank_account_id: Uuid,
    },

    /// Another non-closed reconciliation references this statement.
    #[error("statement {0} already has an open reconciliation")]
    OpenSessionExists(Uuid),

    /// Statement transactions have not been imported yet.
    #[error("statement {0} has no imported transactions")]
    StatementNotProcessed(Uuid),

    /// Transaction already participates in a match.
    #[error("transaction {transaction_id} is already matched to ledger line {ledger_line_id}")]
    TransactionAlreadyMatched {
        /// The transaction named in the request.
        transaction_id: Uuid,
        /// The ledger line it is already paired with.
        ledger_line_id: Uuid,
    },

    /// Ledger line already participates in a match.
    #[error("ledger line {0} is already matched to another transaction")]
    LedgerLineAlreadyMatched(Uuid),

    /// Session is closed; no further mutation permitted.
    #[error("reconciliation {0} is closed and cannot be modified")]
    SessionClosed(Uuid),

    /// Difference exceeds the balance tolerance.
    #[error("reconciliation cannot be closed with difference {difference}")]
    NotBalanced {
        /// The stored difference at close time.
        difference: Decimal,
    },
}

impl ReconciliationError {
    /// Stable machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "RECONCILIATION_NOT_FOUND",
            Self::StatementNotFound(_) => "STATEMENT_NOT_FOUND",
            Self::BankAccountNotFound(_) => "BANK_ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::LedgerLineNotFound(_) => "LEDGER_LINE_NOT_FOUND",
            Self::StatementAccountMismatch { .. } => "STATEMENT_ACCOUNT_MISMATCH",
            Self::OpenSessionExists(_) => "OPEN_SESSION_EXISTS",
            Self::StatementNotProcessed(_) => "STATEMENT_NOT_PROCESSED",
            Self::TransactionAlreadyMatched { .. } | Self::LedgerLineAlreadyMatched(_) => {
                "ALREADY_MATCHED"
            }
            Self::SessionClosed(_) => "SESSION_CLOSED",
            Self::NotBalanced { .. } => "NOT_BALANCED",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_)
            | Self::StatementNotFound(_)
            | Self::BankAccountNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::LedgerLineNotFound(_) => 404,
            Self::StatementAccountMismatch { .. }
            | Self::StatementNotProcessed(_)
            | Self::NotBalanced { .. } => 400,
            Self::OpenSessionExists(_)
            | Self::TransactionAlreadyMatched { .. }
            | Self::LedgerLineAlreadyMatched(_)
            | Self::SessionClosed(_) => 409,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let id = Uuid::new_v4();
        assert_eq!(
            ReconciliationError::NotFound(id).error_code(),
            "RECONCILIATION_NOT_FOUND"
        );
        assert_eq!(
            ReconciliationError::SessionClosed(id).error_code(),
            "SESSION_CLOSED"
        );
        assert_eq!(
            ReconciliationError::TransactionAlreadyMatched {
                transaction_id: id,
                ledger_line_id: id,
            }
            .error_code(),
            "ALREADY_MATCHED"
        );
        assert_eq!(
            ReconciliationError::LedgerLineAlreadyMatched(id).error_code(),
            "ALREADY_MATCHED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        let id = Uuid::new_v4();
        assert_eq!(ReconciliationError::NotFound(id).http_status_code(), 404);
        assert_eq!(
            ReconciliationError::SessionClosed(id).http_status_code(),
            409
        );
        assert_eq!(
            ReconciliationError::NotBalanced {
                difference: dec!(12.50)
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            ReconciliationError::OpenSessionExists(id).http_status_code(),
            409
        );
    }

    #[test]
    fn test_display_includes_ids() {
        let id = Uuid::new_v4();
        let msg = ReconciliationError::SessionClosed(id).to_string();
        assert!(msg.contains(&id.to_string()));
    }
}
