//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod bank_account;
pub mod import_job;
pub mod ledger;
pub mod reconciliation;
pub mod statement;

pub use bank_account::{BankAccountError, BankAccountRepository, CreateBankAccountInput};
pub use import_job::{ImportJobError, ImportJobRepository};
pub use ledger::{CreateLedgerLineInput, LedgerError, LedgerLineRepository};
pub use reconciliation::{ReconciliationDetail, ReconciliationRepository, SessionError};
pub use statement::{ImportOutcome, IngestionError, StatementRepository};
