//! Reconciliation domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Absolute difference below which a reconciliation counts as balanced.
#[must_use]
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Reconciliation session status.
///
/// `Closed` is terminal; every other state permits match/unmatch mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// Balances captured, nothing matched yet.
    Created,
    /// Some transactions matched, difference non-zero.
    InProgress,
    /// Difference within tolerance; eligible for closing.
    Balanced,
    /// User-finalized; no further mutation permitted.
    Closed,
}

impl ReconciliationStatus {
    /// Returns true if the session still accepts match/unmatch mutations.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Returns true if the session may be closed.
    #[must_use]
    pub fn is_closable(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Input for creating a reconciliation session.
#[derive(Debug, Clone)]
pub struct CreateReconciliationInput {
    /// The bank account being reconciled.
    pub bank_account_id: Uuid,
    /// The statement this session works against.
    pub statement_id: Uuid,
    /// Date of the reconciliation.
    pub reconciliation_date: NaiveDate,
    /// Balance per internal accounting records.
    pub book_balance: Decimal,
    /// Balance reported by the bank.
    pub statement_balance: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Statement balances captured at session creation.
///
/// A snapshot, not a live reference: later statement edits do not alter an
/// existing reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Statement opening balance at creation time.
    pub start_balance: Decimal,
    /// Statement closing balance at creation time.
    pub end_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_openness() {
        assert!(ReconciliationStatus::Created.is_open());
        assert!(ReconciliationStatus::InProgress.is_open());
        assert!(ReconciliationStatus::Balanced.is_open());
        assert!(!ReconciliationStatus::Closed.is_open());
    }

    #[test]
    fn test_only_balanced_is_closable() {
        assert!(!ReconciliationStatus::Created.is_closable());
        assert!(!ReconciliationStatus::InProgress.is_closable());
        assert!(ReconciliationStatus::Balanced.is_closable());
        assert!(!ReconciliationStatus::Closed.is_closable());
    }

    #[test]
    fn test_tolerance_is_one_cent() {
        assert_eq!(balance_tolerance(), Decimal::new(1, 2));
    }
}
