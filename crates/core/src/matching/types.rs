//! Matching input and output types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Default date tolerance when the caller does not specify one.
pub const DEFAULT_DATE_TOLERANCE_DAYS: i64 = 3;

/// Parameters for an auto-match pass.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MatchParams {
    /// Maximum days between transaction date and ledger line date, inclusive.
    #[serde(default = "default_date_tolerance")]
    pub date_tolerance_days: i64,
    /// When true, ties among candidates are broken by description similarity.
    #[serde(default)]
    pub description_match: bool,
}

const fn default_date_tolerance() -> i64 {
    DEFAULT_DATE_TOLERANCE_DAYS
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            date_tolerance_days: DEFAULT_DATE_TOLERANCE_DAYS,
            description_match: false,
        }
    }
}

/// An unmatched statement transaction, as seen by the matcher.
#[derive(Debug, Clone)]
pub struct TransactionView {
    pub id: Uuid,
    /// Position within the source file; drives matching order.
    pub row_index: i32,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

/// An unmatched ledger line, as seen by the matcher.
#[derive(Debug, Clone)]
pub struct CandidateView {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

/// One pairing produced by the auto-matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair {
    pub transaction_id: Uuid,
    pub ledger_line_id: Uuid,
}
