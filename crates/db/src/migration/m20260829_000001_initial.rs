//! Initial schema: bank accounts, statements, transactions, ledger lines,
//! reconciliations, and import jobs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(TABLES_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS import_jobs CASCADE;
DROP TABLE IF EXISTS reconciliations CASCADE;
DROP TABLE IF EXISTS statement_transactions CASCADE;
DROP TABLE IF EXISTS ledger_lines CASCADE;
DROP TABLE IF EXISTS bank_statements CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TYPE IF EXISTS import_job_status;
DROP TYPE IF EXISTS ledger_line_kind;
DROP TYPE IF EXISTS reconciliation_status;
DROP TYPE IF EXISTS statement_status;
",
        )
        .await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE statement_status AS ENUM ('uploaded', 'processed');
CREATE TYPE reconciliation_status AS ENUM ('created', 'in_progress', 'balanced', 'closed');
CREATE TYPE ledger_line_kind AS ENUM ('disbursement', 'deposit', 'journal');
CREATE TYPE import_job_status AS ENUM ('processing', 'completed', 'failed', 'rolled_back');
";

const TABLES_SQL: &str = r"
-- Bank accounts with a single authoritative GL account link
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    bank_name VARCHAR(255) NOT NULL,
    account_number_masked VARCHAR(64) NOT NULL,
    routing_number VARCHAR(32),
    gl_account_id UUID NOT NULL,
    current_balance DECIMAL(14, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Uploaded bank statements
CREATE TABLE bank_statements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE CASCADE,
    statement_date DATE NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    opening_balance DECIMAL(14, 2) NOT NULL,
    closing_balance DECIMAL(14, 2) NOT NULL,
    status statement_status NOT NULL DEFAULT 'uploaded',
    file_key TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_period_order CHECK (period_start <= period_end)
);

-- Internal ledger lines: the candidate side of matching
CREATE TABLE ledger_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE CASCADE,
    line_date DATE NOT NULL,
    description TEXT NOT NULL,
    amount DECIMAL(14, 2) NOT NULL,
    kind ledger_line_kind NOT NULL,
    matched BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Imported statement transaction rows
CREATE TABLE statement_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    statement_id UUID NOT NULL REFERENCES bank_statements(id) ON DELETE CASCADE,
    row_index INTEGER NOT NULL,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,
    amount DECIMAL(14, 2) NOT NULL,
    matched_ledger_line_id UUID REFERENCES ledger_lines(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_statement_row UNIQUE (statement_id, row_index)
);

-- Reconciliation sessions
CREATE TABLE reconciliations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE CASCADE,
    statement_id UUID NOT NULL REFERENCES bank_statements(id) ON DELETE CASCADE,
    reconciliation_date DATE NOT NULL,
    start_balance DECIMAL(14, 2) NOT NULL,
    end_balance DECIMAL(14, 2) NOT NULL,
    book_balance DECIMAL(14, 2) NOT NULL,
    statement_balance DECIMAL(14, 2) NOT NULL,
    difference DECIMAL(14, 2) NOT NULL,
    notes TEXT,
    status reconciliation_status NOT NULL DEFAULT 'created',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Durable import job records
CREATE TABLE import_jobs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    statement_id UUID NOT NULL REFERENCES bank_statements(id) ON DELETE CASCADE,
    status import_job_status NOT NULL DEFAULT 'processing',
    inserted_rows INTEGER NOT NULL DEFAULT 0,
    error_message TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_statements_account ON bank_statements(bank_account_id, statement_date DESC);

CREATE INDEX idx_transactions_statement ON statement_transactions(statement_id, row_index);

-- A ledger line is consumed by at most one transaction
CREATE UNIQUE INDEX uq_transactions_matched_line
    ON statement_transactions(matched_ledger_line_id)
    WHERE matched_ledger_line_id IS NOT NULL;

-- Candidate lookup for the auto-matcher
CREATE INDEX idx_ledger_lines_candidates
    ON ledger_lines(bank_account_id, line_date)
    WHERE NOT matched;

-- One open reconciliation per statement
CREATE UNIQUE INDEX uq_reconciliations_open_statement
    ON reconciliations(statement_id)
    WHERE status != 'closed';

CREATE INDEX idx_import_jobs_statement ON import_jobs(statement_id, created_at DESC);
";
