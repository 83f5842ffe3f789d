//! Statement ingestion: upload validation and transaction file parsing.
//!
//! A bank statement is uploaded with period metadata and opening/closing
//! balances, then its transaction rows are imported from a CSV, OFX, or QFX
//! file. Parsing is all-or-nothing: a single bad row fails the whole import.

pub mod error;
pub mod parser;
pub mod service;
pub mod types;

pub use error::StatementError;
pub use parser::parse_statement;
pub use service::{StatementService, StatementState};
pub use types::{StatementFormat, StatementRow, UploadStatementInput};
