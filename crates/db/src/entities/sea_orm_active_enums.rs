//! Database enum types.

use fundra_core::reconciliation::ReconciliationStatus as CoreReconciliationStatus;
use fundra_core::statement::StatementState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bank statement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "statement_status")]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    #[sea_orm(string_value = "uploaded")]
    Uploaded,
    #[sea_orm(string_value = "processed")]
    Processed,
}

impl From<StatementStatus> for StatementState {
    fn from(status: StatementStatus) -> Self {
        match status {
            StatementStatus::Uploaded => Self::Uploaded,
            StatementStatus::Processed => Self::Processed,
        }
    }
}

/// Reconciliation session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "reconciliation_status"
)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "balanced")]
    Balanced,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<ReconciliationStatus> for CoreReconciliationStatus {
    fn from(status: ReconciliationStatus) -> Self {
        match status {
            ReconciliationStatus::Created => Self::Created,
            ReconciliationStatus::InProgress => Self::InProgress,
            ReconciliationStatus::Balanced => Self::Balanced,
            ReconciliationStatus::Closed => Self::Closed,
        }
    }
}

impl From<CoreReconciliationStatus> for ReconciliationStatus {
    fn from(status: CoreReconciliationStatus) -> Self {
        match status {
            CoreReconciliationStatus::Created => Self::Created,
            CoreReconciliationStatus::InProgress => Self::InProgress,
            CoreReconciliationStatus::Balanced => Self::Balanced,
            CoreReconciliationStatus::Closed => Self::Closed,
        }
    }
}

/// Kind of internal ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_line_kind")]
#[serde(rename_all = "snake_case")]
pub enum LedgerLineKind {
    #[sea_orm(string_value = "disbursement")]
    Disbursement,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "journal")]
    Journal,
}

/// Durable import job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "import_job_status")]
#[serde(rename_all = "snake_case")]
pub enum ImportJobStatus {
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "rolled_back")]
    RolledBack,
}
