//! Reconciliation session state machine.
//!
//! A reconciliation compares book records against one bank statement. It is
//! created with balance snapshots, moves between `Created`, `InProgress`,
//! and `Balanced` as transactions are matched, and is closed explicitly once
//! the difference is zero.

pub mod error;
pub mod service;
pub mod types;

pub use error::ReconciliationError;
pub use service::{ReconciliationService, StatementInfo};
pub use types::{
    BalanceSnapshot, CreateReconciliationInput, ReconciliationStatus, balance_tolerance,
};
