//! Statement repository: upload persistence and atomic transaction import.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use fundra_core::statement::{
    StatementError, StatementFormat, StatementRow, StatementService, UploadStatementInput,
};
use fundra_shared::types::PageRequest;

use crate::entities::sea_orm_active_enums::{ImportJobStatus, StatementStatus};
use crate::entities::{bank_accounts, bank_statements, import_jobs, reconciliations,
    statement_transactions};

/// Error types for statement ingestion operations.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// Domain validation or parse failure.
    #[error(transparent)]
    Statement(#[from] StatementError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Result of a transaction import.
#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    /// Durable job record for this import attempt.
    pub job_id: Uuid,
    /// Number of rows inserted.
    pub inserted: usize,
}

/// Statement repository for ingestion operations.
#[derive(Debug, Clone)]
pub struct StatementRepository {
    db: DatabaseConnection,
}

impl StatementRepository {
    /// Creates a new statement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a statement in `uploaded` state.
    ///
    /// # Errors
    ///
    /// Returns an error when validation fails or the bank account does not
    /// exist; no row is created in either case.
    pub async fn create_statement(
        &self,
        input: UploadStatementInput,
        file_key: Option<String>,
    ) -> Result<bank_statements::Model, IngestionError> {
        StatementService::validate_upload(&input)?;

        let account = bank_accounts::Entity::find_by_id(input.bank_account_id)
            .one(&self.db)
            .await?;
        if account.is_none() {
            return Err(StatementError::BankAccountNotFound(input.bank_account_id).into());
        }

        let now = chrono::Utc::now().into();
        let statement = bank_statements::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_account_id: Set(input.bank_account_id),
            statement_date: Set(input.statement_date),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            opening_balance: Set(input.opening_balance),
            closing_balance: Set(input.closing_balance),
            status: Set(StatementStatus::Uploaded),
            file_key: Set(file_key),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let statement = statement.insert(&self.db).await?;
        Ok(statement)
    }

    /// Finds a statement by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<bank_statements::Model>, IngestionError> {
        let statement = bank_statements::Entity::find_by_id(id).one(&self.db).await?;
        Ok(statement)
    }

    /// Records the storage key of the archived raw file.
    ///
    /// # Errors
    ///
    /// Returns an error when the statement does not exist or the update fails.
    pub async fn set_file_key(
        &self,
        statement_id: Uuid,
        file_key: String,
    ) -> Result<(), IngestionError> {
        let statement = bank_statements::Entity::find_by_id(statement_id)
            .one(&self.db)
            .await?
            .ok_or(StatementError::StatementNotFound(statement_id))?;

        let mut active: bank_statements::ActiveModel = statement.into();
        active.file_key = Set(Some(file_key));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Lists statements for a bank account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_account(
        &self,
        bank_account_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<bank_statements::Model>, u64), IngestionError> {
        let query = bank_statements::Entity::find()
            .filter(bank_statements::Column::BankAccountId.eq(bank_account_id));

        let total = query.clone().count(&self.db).await?;
        let statements = query
            .order_by_desc(bank_statements::Column::StatementDate)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((statements, total))
    }

    /// Lists imported transactions for a statement in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        statement_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<statement_transactions::Model>, u64), IngestionError> {
        let query = statement_transactions::Entity::find()
            .filter(statement_transactions::Column::StatementId.eq(statement_id));

        let total = query.clone().count(&self.db).await?;
        let transactions = query
            .order_by_asc(statement_transactions::Column::RowIndex)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((transactions, total))
    }

    /// Imports transaction rows from a statement file, all-or-nothing.
    ///
    /// A durable import job records the attempt: `processing` on entry,
    /// `completed` on success, `failed` when validation or parsing rejects
    /// the file, `rolled_back` when the insert transaction itself fails.
    /// Rows are inserted and the statement flipped to `processed` inside a
    /// single database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when the statement is missing, already processed,
    /// referenced by a reconciliation, or the file fails to parse. In every
    /// failure case zero rows are persisted.
    pub async fn import_transactions(
        &self,
        statement_id: Uuid,
        bytes: &[u8],
        format: StatementFormat,
    ) -> Result<ImportOutcome, IngestionError> {
        let statement = bank_statements::Entity::find_by_id(statement_id)
            .one(&self.db)
            .await?
            .ok_or(StatementError::StatementNotFound(statement_id))?;

        let referenced = reconciliations::Entity::find()
            .filter(reconciliations::Column::StatementId.eq(statement_id))
            .count(&self.db)
            .await?
            > 0;

        let job_id = self.create_job(statement_id).await?;

        let rows = match StatementService::prepare_import(
            statement_id,
            statement.status.into(),
            referenced,
            bytes,
            format,
        ) {
            Ok(rows) => rows,
            Err(e) => {
                self.finish_job(job_id, ImportJobStatus::Failed, 0, Some(e.to_string()))
                    .await?;
                return Err(e.into());
            }
        };

        let inserted = rows.len();
        match self.insert_rows(&statement, rows).await {
            Ok(()) => {
                self.finish_job(job_id, ImportJobStatus::Completed, inserted, None)
                    .await?;
                tracing::info!(%statement_id, inserted, "statement import completed");
                Ok(ImportOutcome { job_id, inserted })
            }
            Err(e) => {
                self.finish_job(job_id, ImportJobStatus::RolledBack, 0, Some(e.to_string()))
                    .await?;
                Err(e.into())
            }
        }
    }

    /// Inserts all rows and flips the statement status in one transaction.
    async fn insert_rows(
        &self,
        statement: &bank_statements::Model,
        rows: Vec<StatementRow>,
    ) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;
        let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();

        for (index, row) in rows.into_iter().enumerate() {
            let row_index = i32::try_from(index).map_err(|_| {
                DbErr::Custom(format!("row index {index} out of range"))
            })?;
            let transaction = statement_transactions::ActiveModel {
                id: Set(Uuid::new_v4()),
                statement_id: Set(statement.id),
                row_index: Set(row_index),
                transaction_date: Set(row.date),
                description: Set(row.description),
                amount: Set(row.amount),
                matched_ledger_line_id: Set(None),
                created_at: Set(now),
            };
            transaction.insert(&txn).await?;
        }

        let mut active: bank_statements::ActiveModel = statement.clone().into();
        active.status = Set(StatementStatus::Processed);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn create_job(&self, statement_id: Uuid) -> Result<Uuid, DbErr> {
        let now = chrono::Utc::now().into();
        let job = import_jobs::ActiveModel {
            id: Set(Uuid::new_v4()),
            statement_id: Set(statement_id),
            status: Set(ImportJobStatus::Processing),
            inserted_rows: Set(0),
            error_message: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let job = job.insert(&self.db).await?;
        Ok(job.id)
    }

    async fn finish_job(
        &self,
        job_id: Uuid,
        status: ImportJobStatus,
        inserted: usize,
        error_message: Option<String>,
    ) -> Result<(), DbErr> {
        let job = import_jobs::Entity::find_by_id(job_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::Custom(format!("import job {job_id} missing")))?;

        let mut active: import_jobs::ActiveModel = job.into();
        active.status = Set(status);
        active.inserted_rows = Set(i32::try_from(inserted).unwrap_or(i32::MAX));
        active.error_message = Set(error_message);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }
}
