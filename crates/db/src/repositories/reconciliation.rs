//! Reconciliation repository: session lifecycle and match bookkeeping.
//!
//! Every mutation (match, unmatch, auto-match, close) runs inside one
//! database transaction so no partial match state can persist, and the
//! session difference and status are recomputed before commit.

use chrono::Duration;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use fundra_core::matching::{self, CandidateView, MatchParams, TransactionView};
use fundra_core::reconciliation::{
    CreateReconciliationInput, ReconciliationError, ReconciliationService, StatementInfo,
};

use crate::entities::sea_orm_active_enums::{ReconciliationStatus, StatementStatus};
use crate::entities::{
    bank_accounts, bank_statements, ledger_lines, reconciliations, statement_transactions,
};

/// Error types for reconciliation session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Domain rule violation.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// A reconciliation with its match counts.
#[derive(Debug, Clone)]
pub struct ReconciliationDetail {
    /// The session record.
    pub reconciliation: reconciliations::Model,
    /// Matched statement transactions.
    pub matched_count: u64,
    /// Unmatched statement transactions.
    pub unmatched_count: u64,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a reconciliation session, snapshotting statement balances.
    ///
    /// The initial difference and status account for transactions already
    /// matched against the statement, so a fresh attempt after a closed one
    /// starts from the state the surviving matches imply.
    ///
    /// # Errors
    ///
    /// Returns an error when the statement or account is missing, the
    /// statement belongs to a different account or is unprocessed, or an
    /// open session already exists for the statement.
    pub async fn create(
        &self,
        input: CreateReconciliationInput,
    ) -> Result<reconciliations::Model, SessionError> {
        let account = bank_accounts::Entity::find_by_id(input.bank_account_id)
            .one(&self.db)
            .await?;
        if account.is_none() {
            return Err(ReconciliationError::BankAccountNotFound(input.bank_account_id).into());
        }

        let statement = bank_statements::Entity::find_by_id(input.statement_id)
            .one(&self.db)
            .await?
            .ok_or(ReconciliationError::StatementNotFound(input.statement_id))?;

        let open_sessions = reconciliations::Entity::find()
            .filter(reconciliations::Column::StatementId.eq(input.statement_id))
            .filter(reconciliations::Column::Status.ne(ReconciliationStatus::Closed))
            .all(&self.db)
            .await?;

        let info = StatementInfo {
            bank_account_id: statement.bank_account_id,
            processed: statement.status == StatementStatus::Processed,
            has_open_session: !open_sessions.is_empty(),
            opening_balance: statement.opening_balance,
            closing_balance: statement.closing_balance,
        };
        let snapshot = ReconciliationService::validate_create(&input, &info)?;

        // Matched transactions survive a closed attempt, so a new session
        // must start from the same difference a recompute would produce.
        let matched = statement_transactions::Entity::find()
            .filter(statement_transactions::Column::StatementId.eq(input.statement_id))
            .filter(statement_transactions::Column::MatchedLedgerLineId.is_not_null())
            .all(&self.db)
            .await?;
        let matched_total = matched
            .iter()
            .map(|t| t.amount)
            .sum::<rust_decimal::Decimal>();
        let difference = ReconciliationService::compute_difference(
            input.statement_balance,
            input.book_balance,
            matched_total,
        );
        let status = ReconciliationService::status_for(difference, matched.len() as u64);

        let now = chrono::Utc::now().into();
        let session = reconciliations::ActiveModel {
            id: Set(Uuid::new_v4()),
            bank_account_id: Set(input.bank_account_id),
            statement_id: Set(input.statement_id),
            reconciliation_date: Set(input.reconciliation_date),
            start_balance: Set(snapshot.start_balance),
            end_balance: Set(snapshot.end_balance),
            book_balance: Set(input.book_balance),
            statement_balance: Set(input.statement_balance),
            difference: Set(difference),
            notes: Set(input.notes),
            status: Set(status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let session = session.insert(&self.db).await?;
        Ok(session)
    }

    /// Finds a reconciliation by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<reconciliations::Model>, SessionError> {
        let session = reconciliations::Entity::find_by_id(id).one(&self.db).await?;
        Ok(session)
    }

    /// Loads a reconciliation with its matched/unmatched counts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the session does not exist.
    pub async fn detail(&self, id: Uuid) -> Result<ReconciliationDetail, SessionError> {
        let session = self
            .find_by_id(id)
            .await?
            .ok_or(ReconciliationError::NotFound(id))?;

        let transactions = statement_transactions::Entity::find()
            .filter(statement_transactions::Column::StatementId.eq(session.statement_id))
            .all(&self.db)
            .await?;

        let matched = transactions
            .iter()
            .filter(|t| t.matched_ledger_line_id.is_some())
            .count() as u64;
        let total = transactions.len() as u64;

        Ok(ReconciliationDetail {
            reconciliation: session,
            matched_count: matched,
            unmatched_count: total - matched,
        })
    }

    /// Manually matches a statement transaction to a ledger line.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is closed, either id is outside the
    /// session's scope, or either side is already matched. The first pairing
    /// stays intact on failure.
    pub async fn match_transaction(
        &self,
        reconciliation_id: Uuid,
        transaction_id: Uuid,
        ledger_line_id: Uuid,
    ) -> Result<reconciliations::Model, SessionError> {
        let txn = self.db.begin().await?;

        let session = Self::load_open_session(&txn, reconciliation_id).await?;

        let transaction = statement_transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await?
            .filter(|t| t.statement_id == session.statement_id)
            .ok_or(ReconciliationError::TransactionNotFound(transaction_id))?;

        let line = ledger_lines::Entity::find_by_id(ledger_line_id)
            .one(&txn)
            .await?
            .filter(|l| l.bank_account_id == session.bank_account_id)
            .ok_or(ReconciliationError::LedgerLineNotFound(ledger_line_id))?;

        ReconciliationService::validate_match(
            transaction.id,
            transaction.matched_ledger_line_id,
            line.id,
            line.matched,
        )?;

        Self::apply_match(&txn, transaction, line).await?;
        let session = Self::recompute(&txn, session).await?;

        txn.commit().await?;
        Ok(session)
    }

    /// Unmatches a statement transaction; idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is closed or the transaction is
    /// outside its scope. Unmatching an unmatched transaction is a no-op.
    pub async fn unmatch_transaction(
        &self,
        reconciliation_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<reconciliations::Model, SessionError> {
        let txn = self.db.begin().await?;

        let session = Self::load_open_session(&txn, reconciliation_id).await?;

        let transaction = statement_transactions::Entity::find_by_id(transaction_id)
            .one(&txn)
            .await?
            .filter(|t| t.statement_id == session.statement_id)
            .ok_or(ReconciliationError::TransactionNotFound(transaction_id))?;

        let session = if let Some(line_id) = transaction.matched_ledger_line_id {
            let line = ledger_lines::Entity::find_by_id(line_id)
                .one(&txn)
                .await?
                .ok_or(ReconciliationError::LedgerLineNotFound(line_id))?;

            let mut active_line: ledger_lines::ActiveModel = line.into();
            active_line.matched = Set(false);
            active_line.update(&txn).await?;

            let mut active_tx: statement_transactions::ActiveModel = transaction.into();
            active_tx.matched_ledger_line_id = Set(None);
            active_tx.update(&txn).await?;

            Self::recompute(&txn, session).await?
        } else {
            session
        };

        txn.commit().await?;
        Ok(session)
    }

    /// Runs the greedy auto-match pass; returns the number of new matches.
    ///
    /// Candidates are unmatched ledger lines of the session's account whose
    /// date falls within the statement period padded by the tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error when the session is missing or closed; zero matches
    /// is a success.
    pub async fn auto_match(
        &self,
        reconciliation_id: Uuid,
        params: MatchParams,
    ) -> Result<(reconciliations::Model, usize), SessionError> {
        let txn = self.db.begin().await?;

        let session = Self::load_open_session(&txn, reconciliation_id).await?;

        let statement = bank_statements::Entity::find_by_id(session.statement_id)
            .one(&txn)
            .await?
            .ok_or(ReconciliationError::StatementNotFound(session.statement_id))?;

        let transactions = statement_transactions::Entity::find()
            .filter(statement_transactions::Column::StatementId.eq(session.statement_id))
            .filter(statement_transactions::Column::MatchedLedgerLineId.is_null())
            .order_by_asc(statement_transactions::Column::RowIndex)
            .all(&txn)
            .await?;

        let pad = Duration::days(params.date_tolerance_days.max(0));
        let candidates = ledger_lines::Entity::find()
            .filter(ledger_lines::Column::BankAccountId.eq(session.bank_account_id))
            .filter(ledger_lines::Column::Matched.eq(false))
            .filter(ledger_lines::Column::LineDate.gte(statement.period_start - pad))
            .filter(ledger_lines::Column::LineDate.lte(statement.period_end + pad))
            .all(&txn)
            .await?;

        let tx_views: Vec<TransactionView> = transactions
            .iter()
            .map(|t| TransactionView {
                id: t.id,
                row_index: t.row_index,
                date: t.transaction_date,
                description: t.description.clone(),
                amount: t.amount,
            })
            .collect();
        let candidate_views: Vec<CandidateView> = candidates
            .iter()
            .map(|l| CandidateView {
                id: l.id,
                date: l.line_date,
                description: l.description.clone(),
                amount: l.amount,
            })
            .collect();

        let pairs = matching::auto_match(&tx_views, &candidate_views, &params);
        let matches = pairs.len();

        for pair in pairs {
            let transaction = transactions
                .iter()
                .find(|t| t.id == pair.transaction_id)
                .cloned()
                .ok_or(ReconciliationError::TransactionNotFound(pair.transaction_id))?;
            let line = candidates
                .iter()
                .find(|l| l.id == pair.ledger_line_id)
                .cloned()
                .ok_or(ReconciliationError::LedgerLineNotFound(pair.ledger_line_id))?;
            Self::apply_match(&txn, transaction, line).await?;
        }

        let session = Self::recompute(&txn, session).await?;

        txn.commit().await?;
        tracing::info!(%reconciliation_id, matches, "auto-match pass completed");
        Ok((session, matches))
    }

    /// Closes a balanced reconciliation; terminal.
    ///
    /// # Errors
    ///
    /// Returns `NotBalanced` when the difference exceeds the tolerance, or
    /// `SessionClosed` when already closed.
    pub async fn close(
        &self,
        reconciliation_id: Uuid,
    ) -> Result<reconciliations::Model, SessionError> {
        let session = self
            .find_by_id(reconciliation_id)
            .await?
            .ok_or(ReconciliationError::NotFound(reconciliation_id))?;

        ReconciliationService::validate_can_close(
            session.id,
            session.status.into(),
            session.difference,
        )?;

        let mut active: reconciliations::ActiveModel = session.into();
        active.status = Set(ReconciliationStatus::Closed);
        active.updated_at = Set(chrono::Utc::now().into());
        let session = active.update(&self.db).await?;
        Ok(session)
    }

    /// Loads a session and rejects mutation when it is closed.
    async fn load_open_session(
        txn: &DatabaseTransaction,
        id: Uuid,
    ) -> Result<reconciliations::Model, SessionError> {
        let session = reconciliations::Entity::find_by_id(id)
            .one(txn)
            .await?
            .ok_or(ReconciliationError::NotFound(id))?;

        ReconciliationService::validate_can_mutate(session.id, session.status.into())?;

        Ok(session)
    }

    /// Marks both sides of a pairing.
    async fn apply_match<C: ConnectionTrait>(
        conn: &C,
        transaction: statement_transactions::Model,
        line: ledger_lines::Model,
    ) -> Result<(), DbErr> {
        let line_id = line.id;

        let mut active_line: ledger_lines::ActiveModel = line.into();
        active_line.matched = Set(true);
        active_line.update(conn).await?;

        let mut active_tx: statement_transactions::ActiveModel = transaction.into();
        active_tx.matched_ledger_line_id = Set(Some(line_id));
        active_tx.update(conn).await?;

        Ok(())
    }

    /// Recomputes the difference and status from the current match set.
    async fn recompute<C: ConnectionTrait>(
        conn: &C,
        session: reconciliations::Model,
    ) -> Result<reconciliations::Model, SessionError> {
        let matched = statement_transactions::Entity::find()
            .filter(statement_transactions::Column::StatementId.eq(session.statement_id))
            .filter(statement_transactions::Column::MatchedLedgerLineId.is_not_null())
            .all(conn)
            .await?;

        let matched_total = matched
            .iter()
            .map(|t| t.amount)
            .sum::<rust_decimal::Decimal>();
        let difference = ReconciliationService::compute_difference(
            session.statement_balance,
            session.book_balance,
            matched_total,
        );
        let status = ReconciliationService::status_for(difference, matched.len() as u64);

        let mut active: reconciliations::ActiveModel = session.into();
        active.difference = Set(difference);
        active.status = Set(status.into());
        active.updated_at = Set(chrono::Utc::now().into());
        let session = active.update(conn).await?;
        Ok(session)
    }
}
