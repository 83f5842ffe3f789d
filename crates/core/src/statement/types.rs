//! Statement domain types for upload and import.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported statement file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Open Financial Exchange (SGML flavor).
    Ofx,
    /// Quicken Financial Exchange (OFX dialect, same wire shape).
    Qfx,
}

impl std::fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Ofx => write!(f, "ofx"),
            Self::Qfx => write!(f, "qfx"),
        }
    }
}

impl std::str::FromStr for StatementFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "ofx" => Ok(Self::Ofx),
            "qfx" => Ok(Self::Qfx),
            _ => Err(format!("Unknown statement format: {s}")),
        }
    }
}

/// One parsed transaction row from a statement file.
///
/// Rows keep their file order; the importer persists them with a row index so
/// statement order survives into the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRow {
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text description from the bank.
    pub description: String,
    /// Signed amount: positive for deposits, negative for debits.
    pub amount: Decimal,
}

/// Input for uploading a new bank statement.
#[derive(Debug, Clone)]
pub struct UploadStatementInput {
    /// The bank account this statement belongs to.
    pub bank_account_id: Uuid,
    /// The statement date (usually the period end).
    pub statement_date: NaiveDate,
    /// First day covered by the statement.
    pub period_start: NaiveDate,
    /// Last day covered by the statement.
    pub period_end: NaiveDate,
    /// Balance at the start of the period.
    pub opening_balance: Decimal,
    /// Balance at the end of the period.
    pub closing_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_round_trip() {
        for s in ["csv", "ofx", "qfx"] {
            let f = StatementFormat::from_str(s).unwrap();
            assert_eq!(f.to_string(), s);
        }
    }

    #[test]
    fn test_format_case_insensitive() {
        assert_eq!(
            StatementFormat::from_str("OFX").unwrap(),
            StatementFormat::Ofx
        );
        assert_eq!(
            StatementFormat::from_str("Csv").unwrap(),
            StatementFormat::Csv
        );
    }

    #[test]
    fn test_format_unknown() {
        assert!(StatementFormat::from_str("qif").is_err());
        assert!(StatementFormat::from_str("").is_err());
    }
}
