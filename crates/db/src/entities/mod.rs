//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod bank_statements;
pub mod import_jobs;
pub mod ledger_lines;
pub mod reconciliations;
pub mod sea_orm_active_enums;
pub mod statement_transactions;
