//! Statement service for upload validation and import preparation.
//!
//! Pure business logic with no database dependencies: the persistence layer
//! supplies current state and persists the outcome.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::StatementError;
use super::parser::parse_statement;
use super::types::{StatementFormat, StatementRow, UploadStatementInput};

/// Lifecycle of a bank statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    /// Metadata uploaded, no transactions imported yet.
    Uploaded,
    /// Transactions imported; the statement is immutable from here on.
    Processed,
}

/// Statement service for ingestion validation.
pub struct StatementService;

impl StatementService {
    /// Validate a statement upload before persisting.
    ///
    /// Checks:
    /// 1. `period_start <= period_end`
    /// 2. opening/closing balances carry at most two decimal places
    ///
    /// # Errors
    ///
    /// Returns `StatementError` if validation fails; no statement row may be
    /// created in that case.
    pub fn validate_upload(input: &UploadStatementInput) -> Result<(), StatementError> {
        if input.period_start > input.period_end {
            return Err(StatementError::InvalidPeriod {
                start: input.period_start,
                end: input.period_end,
            });
        }

        Self::validate_amount(input.opening_balance)?;
        Self::validate_amount(input.closing_balance)?;

        Ok(())
    }

    /// Validate preconditions and parse the file for a transaction import.
    ///
    /// Re-import is disallowed once a statement is processed or referenced by
    /// any reconciliation; this is the advisory serialization for concurrent
    /// imports against the same statement.
    ///
    /// # Errors
    ///
    /// Returns `StatementError` if the statement state forbids import or the
    /// file cannot be parsed. A parse failure means zero rows are persisted.
    pub fn prepare_import(
        statement_id: Uuid,
        state: StatementState,
        referenced_by_reconciliation: bool,
        bytes: &[u8],
        format: StatementFormat,
    ) -> Result<Vec<StatementRow>, StatementError> {
        if referenced_by_reconciliation {
            return Err(StatementError::StatementReferenced(statement_id));
        }
        if state == StatementState::Processed {
            return Err(StatementError::AlreadyProcessed(statement_id));
        }

        parse_statement(bytes, format)
    }

    fn validate_amount(amount: Decimal) -> Result<(), StatementError> {
        if amount.normalize().scale() > 2 {
            return Err(StatementError::InvalidAmount(amount.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn make_input() -> UploadStatementInput {
        UploadStatementInput {
            bank_account_id: Uuid::new_v4(),
            statement_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            opening_balance: dec!(1000.00),
            closing_balance: dec!(1500.00),
        }
    }

    #[test]
    fn test_validate_upload_ok() {
        assert!(StatementService::validate_upload(&make_input()).is_ok());
    }

    #[test]
    fn test_validate_upload_single_day_period() {
        let mut input = make_input();
        input.period_start = input.period_end;
        assert!(StatementService::validate_upload(&input).is_ok());
    }

    #[test]
    fn test_validate_upload_inverted_period() {
        let mut input = make_input();
        input.period_start = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let result = StatementService::validate_upload(&input);
        assert!(matches!(result, Err(StatementError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_validate_upload_sub_cent_balance() {
        let mut input = make_input();
        input.opening_balance = dec!(1000.005);
        let result = StatementService::validate_upload(&input);
        assert!(matches!(result, Err(StatementError::InvalidAmount(_))));
    }

    #[test]
    fn test_validate_upload_trailing_zero_scale_ok() {
        let mut input = make_input();
        // 1000.0000 normalizes to scale 1; only real sub-cent precision fails.
        input.opening_balance = dec!(1000.0000);
        assert!(StatementService::validate_upload(&input).is_ok());
    }

    #[test]
    fn test_prepare_import_ok() {
        let csv = b"date,description,amount\n2026-01-05,Deposit,100.00\n";
        let rows = StatementService::prepare_import(
            Uuid::new_v4(),
            StatementState::Uploaded,
            false,
            csv,
            StatementFormat::Csv,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_prepare_import_already_processed() {
        let csv = b"date,description,amount\n2026-01-05,Deposit,100.00\n";
        let id = Uuid::new_v4();
        let result = StatementService::prepare_import(
            id,
            StatementState::Processed,
            false,
            csv,
            StatementFormat::Csv,
        );
        assert!(matches!(result, Err(StatementError::AlreadyProcessed(e)) if e == id));
    }

    #[test]
    fn test_prepare_import_referenced_statement() {
        let csv = b"date,description,amount\n2026-01-05,Deposit,100.00\n";
        let result = StatementService::prepare_import(
            Uuid::new_v4(),
            StatementState::Uploaded,
            true,
            csv,
            StatementFormat::Csv,
        );
        assert!(matches!(result, Err(StatementError::StatementReferenced(_))));
    }

    #[test]
    fn test_prepare_import_parse_failure_yields_no_rows() {
        let csv = b"date,description,amount\n2026-01-05,Good,10.00\nbad,Bad,oops\n";
        let result = StatementService::prepare_import(
            Uuid::new_v4(),
            StatementState::Uploaded,
            false,
            csv,
            StatementFormat::Csv,
        );
        assert!(matches!(result, Err(StatementError::Parse(_))));
    }
}
