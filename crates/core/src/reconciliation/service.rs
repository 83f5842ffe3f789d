//! Reconciliation service: session validation and status recomputation.
//!
//! Pure business logic with no database dependencies. The persistence layer
//! loads current state, calls into this service, and persists the outcome
//! inside its own transaction.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReconciliationError;
use super::types::{
    BalanceSnapshot, CreateReconciliationInput, ReconciliationStatus, balance_tolerance,
};

/// Statement facts needed to validate session creation.
#[derive(Debug, Clone, Copy)]
pub struct StatementInfo {
    /// Account the statement belongs to.
    pub bank_account_id: Uuid,
    /// True once transactions have been imported.
    pub processed: bool,
    /// True if any non-closed reconciliation references this statement.
    pub has_open_session: bool,
    /// Statement opening balance.
    pub opening_balance: Decimal,
    /// Statement closing balance.
    pub closing_balance: Decimal,
}

/// Reconciliation session service.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Validate session creation and capture the statement balance snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ReconciliationError` when the statement belongs to a different
    /// account, has not been processed, or already has an open session.
    pub fn validate_create(
        input: &CreateReconciliationInput,
        statement: &StatementInfo,
    ) -> Result<BalanceSnapshot, ReconciliationError> {
        if statement.bank_account_id != input.bank_account_id {
            return Err(ReconciliationError::StatementAccountMismatch {
                statement_id: input.statement_id,
                bank_account_id: input.bank_account_id,
            });
        }
        if !statement.processed {
            return Err(ReconciliationError::StatementNotProcessed(
                input.statement_id,
            ));
        }
        if statement.has_open_session {
            return Err(ReconciliationError::OpenSessionExists(input.statement_id));
        }

        Ok(BalanceSnapshot {
            start_balance: statement.opening_balance,
            end_balance: statement.closing_balance,
        })
    }

    /// Difference between the bank's view and the books plus matched activity.
    ///
    /// `statement_balance - (book_balance + matched_total)`. Zero means the
    /// matched statement activity fully explains the gap between the books
    /// and the bank.
    #[must_use]
    pub fn compute_difference(
        statement_balance: Decimal,
        book_balance: Decimal,
        matched_total: Decimal,
    ) -> Decimal {
        statement_balance - (book_balance + matched_total)
    }

    /// Recompute the session status after a match or unmatch.
    ///
    /// Never returns `Closed`; closing is an explicit operation.
    #[must_use]
    pub fn status_for(difference: Decimal, matched_count: u64) -> ReconciliationStatus {
        if matched_count == 0 {
            ReconciliationStatus::Created
        } else if difference.abs() <= balance_tolerance() {
            ReconciliationStatus::Balanced
        } else {
            ReconciliationStatus::InProgress
        }
    }

    /// Reject mutations against a closed session.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` when the session status is `Closed`.
    pub fn validate_can_mutate(
        reconciliation_id: Uuid,
        status: ReconciliationStatus,
    ) -> Result<(), ReconciliationError> {
        if !status.is_open() {
            return Err(ReconciliationError::SessionClosed(reconciliation_id));
        }
        Ok(())
    }

    /// Validate an explicit close request.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` if already closed, or `NotBalanced` with the
    /// current difference when it exceeds the tolerance.
    pub fn validate_can_close(
        reconciliation_id: Uuid,
        status: ReconciliationStatus,
        difference: Decimal,
    ) -> Result<(), ReconciliationError> {
        Self::validate_can_mutate(reconciliation_id, status)?;
        if difference.abs() > balance_tolerance() {
            return Err(ReconciliationError::NotBalanced { difference });
        }
        Ok(())
    }

    /// Validate that both sides of a manual match are free.
    ///
    /// # Errors
    ///
    /// Returns `TransactionAlreadyMatched` or `LedgerLineAlreadyMatched` when
    /// either side already participates in a match.
    pub fn validate_match(
        transaction_id: Uuid,
        existing_match: Option<Uuid>,
        ledger_line_id: Uuid,
        ledger_line_matched: bool,
    ) -> Result<(), ReconciliationError> {
        if let Some(matched_line) = existing_match {
            return Err(ReconciliationError::TransactionAlreadyMatched {
                transaction_id,
                ledger_line_id: matched_line,
            });
        }
        if ledger_line_matched {
            return Err(ReconciliationError::LedgerLineAlreadyMatched(
                ledger_line_id,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_input() -> CreateReconciliationInput {
        CreateReconciliationInput {
            bank_account_id: Uuid::new_v4(),
            statement_id: Uuid::new_v4(),
            reconciliation_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            book_balance: dec!(1000.00),
            statement_balance: dec!(1500.00),
            notes: None,
        }
    }

    fn make_statement(input: &CreateReconciliationInput) -> StatementInfo {
        StatementInfo {
            bank_account_id: input.bank_account_id,
            processed: true,
            has_open_session: false,
            opening_balance: dec!(1000.00),
            closing_balance: dec!(1500.00),
        }
    }

    #[test]
    fn test_validate_create_captures_snapshot() {
        let input = make_input();
        let statement = make_statement(&input);
        let snapshot = ReconciliationService::validate_create(&input, &statement).unwrap();
        assert_eq!(snapshot.start_balance, dec!(1000.00));
        assert_eq!(snapshot.end_balance, dec!(1500.00));
    }

    #[test]
    fn test_validate_create_account_mismatch() {
        let input = make_input();
        let mut statement = make_statement(&input);
        statement.bank_account_id = Uuid::new_v4();
        let result = ReconciliationService::validate_create(&input, &statement);
        assert!(matches!(
            result,
            Err(ReconciliationError::StatementAccountMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_create_unprocessed_statement() {
        let input = make_input();
        let mut statement = make_statement(&input);
        statement.processed = false;
        let result = ReconciliationService::validate_create(&input, &statement);
        assert!(matches!(
            result,
            Err(ReconciliationError::StatementNotProcessed(_))
        ));
    }

    #[test]
    fn test_validate_create_open_session_exists() {
        let input = make_input();
        let mut statement = make_statement(&input);
        statement.has_open_session = true;
        let result = ReconciliationService::validate_create(&input, &statement);
        assert!(matches!(
            result,
            Err(ReconciliationError::OpenSessionExists(_))
        ));
    }

    #[test]
    fn test_difference_formula() {
        // statement 1500, books 1000, matched +200 -50 +350 = 500 -> balanced
        let diff = ReconciliationService::compute_difference(dec!(1500), dec!(1000), dec!(500));
        assert_eq!(diff, dec!(0));

        let diff = ReconciliationService::compute_difference(dec!(1500), dec!(1000), dec!(150));
        assert_eq!(diff, dec!(350));
    }

    #[test]
    fn test_difference_with_negative_matched_total() {
        let diff = ReconciliationService::compute_difference(dec!(950), dec!(1000), dec!(-50));
        assert_eq!(diff, dec!(0));
    }

    #[test]
    fn test_status_nothing_matched_is_created() {
        assert_eq!(
            ReconciliationService::status_for(dec!(500), 0),
            ReconciliationStatus::Created
        );
    }

    #[test]
    fn test_status_within_tolerance_is_balanced() {
        assert_eq!(
            ReconciliationService::status_for(dec!(0), 3),
            ReconciliationStatus::Balanced
        );
        assert_eq!(
            ReconciliationService::status_for(dec!(0.01), 3),
            ReconciliationStatus::Balanced
        );
        assert_eq!(
            ReconciliationService::status_for(dec!(-0.01), 3),
            ReconciliationStatus::Balanced
        );
    }

    #[test]
    fn test_status_just_past_tolerance_is_in_progress() {
        assert_eq!(
            ReconciliationService::status_for(dec!(0.02), 3),
            ReconciliationStatus::InProgress
        );
        assert_eq!(
            ReconciliationService::status_for(dec!(-0.02), 1),
            ReconciliationStatus::InProgress
        );
    }

    #[test]
    fn test_mutate_closed_session_rejected() {
        let id = Uuid::new_v4();
        let result = ReconciliationService::validate_can_mutate(id, ReconciliationStatus::Closed);
        assert!(matches!(result, Err(ReconciliationError::SessionClosed(e)) if e == id));

        for status in [
            ReconciliationStatus::Created,
            ReconciliationStatus::InProgress,
            ReconciliationStatus::Balanced,
        ] {
            assert!(ReconciliationService::validate_can_mutate(id, status).is_ok());
        }
    }

    #[test]
    fn test_close_requires_balance() {
        let id = Uuid::new_v4();
        let result = ReconciliationService::validate_can_close(
            id,
            ReconciliationStatus::InProgress,
            dec!(350),
        );
        assert!(matches!(
            result,
            Err(ReconciliationError::NotBalanced { difference }) if difference == dec!(350)
        ));

        assert!(
            ReconciliationService::validate_can_close(id, ReconciliationStatus::Balanced, dec!(0))
                .is_ok()
        );
        // Tolerance boundary is inclusive.
        assert!(
            ReconciliationService::validate_can_close(
                id,
                ReconciliationStatus::Balanced,
                dec!(-0.01)
            )
            .is_ok()
        );
    }

    #[test]
    fn test_close_already_closed() {
        let id = Uuid::new_v4();
        let result =
            ReconciliationService::validate_can_close(id, ReconciliationStatus::Closed, dec!(0));
        assert!(matches!(result, Err(ReconciliationError::SessionClosed(_))));
    }

    #[test]
    fn test_validate_match_both_free() {
        let result =
            ReconciliationService::validate_match(Uuid::new_v4(), None, Uuid::new_v4(), false);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_match_transaction_taken() {
        let line = Uuid::new_v4();
        let result =
            ReconciliationService::validate_match(Uuid::new_v4(), Some(line), Uuid::new_v4(), false);
        assert!(matches!(
            result,
            Err(ReconciliationError::TransactionAlreadyMatched { ledger_line_id, .. })
                if ledger_line_id == line
        ));
    }

    #[test]
    fn test_validate_match_ledger_line_taken() {
        let line = Uuid::new_v4();
        let result = ReconciliationService::validate_match(Uuid::new_v4(), None, line, true);
        assert!(matches!(
            result,
            Err(ReconciliationError::LedgerLineAlreadyMatched(l)) if l == line
        ));
    }
}
