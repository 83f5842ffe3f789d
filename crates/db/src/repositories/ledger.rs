//! Ledger line repository.
//!
//! Ledger lines are the internal candidate side of matching. This repository
//! covers creation (used by the seeder and tooling) and candidate listing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::ledger_lines;
use crate::entities::sea_orm_active_enums::LedgerLineKind;

/// Error types for ledger line operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Ledger line not found.
    #[error("ledger line not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a ledger line.
#[derive(Debug, Clone)]
pub struct CreateLedgerLineInput {
    /// The bank account this line posts against.
    pub bank_account_id: Uuid,
    /// Posting date.
    pub line_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Signed amount: positive deposits, negative disbursements.
    pub amount: Decimal,
    /// Line kind.
    pub kind: LedgerLineKind,
}

/// Ledger line repository.
#[derive(Debug, Clone)]
pub struct LedgerLineRepository {
    db: DatabaseConnection,
}

impl LedgerLineRepository {
    /// Creates a new ledger line repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an unmatched ledger line.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: CreateLedgerLineInput,
    ) -> Result<ledger_lines::Model, LedgerError> {
        let line = ledger_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_account_id: Set(input.bank_account_id),
            line_date: Set(input.line_date),
            description: Set(input.description),
            amount: Set(input.amount),
            kind: Set(input.kind),
            matched: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let line = line.insert(&self.db).await?;
        Ok(line)
    }

    /// Finds a ledger line by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ledger_lines::Model>, LedgerError> {
        let line = ledger_lines::Entity::find_by_id(id).one(&self.db).await?;
        Ok(line)
    }

    /// Lists unmatched lines for an account within a date window.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_unmatched(
        &self,
        bank_account_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ledger_lines::Model>, LedgerError> {
        let lines = ledger_lines::Entity::find()
            .filter(ledger_lines::Column::BankAccountId.eq(bank_account_id))
            .filter(ledger_lines::Column::Matched.eq(false))
            .filter(ledger_lines::Column::LineDate.gte(from))
            .filter(ledger_lines::Column::LineDate.lte(to))
            .order_by_asc(ledger_lines::Column::LineDate)
            .all(&self.db)
            .await?;

        Ok(lines)
    }
}
