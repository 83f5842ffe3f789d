//! `SeaORM` Entity for reconciliations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ReconciliationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub statement_id: Uuid,
    pub reconciliation_date: Date,
    /// Statement opening balance snapshot, captured at creation.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub start_balance: Decimal,
    /// Statement closing balance snapshot, captured at creation.
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub end_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub book_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub statement_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub difference: Decimal,
    pub notes: Option<String>,
    pub status: ReconciliationStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
    #[sea_orm(
        belongs_to = "super::bank_statements::Entity",
        from = "Column::StatementId",
        to = "super::bank_statements::Column::Id"
    )]
    BankStatements,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl Related<super::bank_statements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankStatements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
