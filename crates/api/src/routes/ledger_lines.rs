//! Ledger line routes.
//!
//! Ledger lines are the internal side of matching: deposits, disbursements,
//! and journal entries posted against a bank account.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use fundra_db::entities::{ledger_lines, sea_orm_active_enums::LedgerLineKind};
use fundra_db::repositories::bank_account::{BankAccountError, BankAccountRepository};
use fundra_db::repositories::ledger::{CreateLedgerLineInput, LedgerError, LedgerLineRepository};
use fundra_shared::AppError;

/// Creates the ledger line routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts/{id}/ledger-lines", post(create_ledger_line))
        .route("/bank-accounts/{id}/ledger-lines", get(list_unmatched_lines))
        .route("/ledger-lines/{id}", get(get_ledger_line))
}

/// Request body for creating a ledger line.
#[derive(Debug, Deserialize)]
pub struct CreateLedgerLineRequest {
    /// Posting date.
    pub line_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Signed amount: positive deposits, negative disbursements.
    pub amount: Decimal,
    /// Line kind: `deposit`, `disbursement`, or `journal`.
    pub kind: String,
}

/// Query window for listing unmatched candidates.
#[derive(Debug, Deserialize)]
pub struct CandidateWindow {
    /// Window start (inclusive).
    pub from: NaiveDate,
    /// Window end (inclusive).
    pub to: NaiveDate,
}

/// Response for a ledger line.
#[derive(Debug, Serialize)]
pub struct LedgerLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// The bank account this line posts against.
    pub bank_account_id: Uuid,
    /// Posting date.
    pub line_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Line kind.
    pub kind: String,
    /// True once matched to a statement transaction.
    pub matched: bool,
}

impl From<ledger_lines::Model> for LedgerLineResponse {
    fn from(model: ledger_lines::Model) -> Self {
        Self {
            id: model.id,
            bank_account_id: model.bank_account_id,
            line_date: model.line_date,
            description: model.description,
            amount: model.amount,
            kind: kind_name(model.kind).to_string(),
            matched: model.matched,
        }
    }
}

fn kind_name(kind: LedgerLineKind) -> &'static str {
    match kind {
        LedgerLineKind::Deposit => "deposit",
        LedgerLineKind::Disbursement => "disbursement",
        LedgerLineKind::Journal => "journal",
    }
}

fn parse_kind(kind: &str) -> Option<LedgerLineKind> {
    match kind {
        "deposit" => Some(LedgerLineKind::Deposit),
        "disbursement" => Some(LedgerLineKind::Disbursement),
        "journal" => Some(LedgerLineKind::Journal),
        _ => None,
    }
}

/// POST `/bank-accounts/{account_id}/ledger-lines` - Create a ledger line.
async fn create_ledger_line(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<CreateLedgerLineRequest>,
) -> Response {
    let Some(kind) = parse_kind(&payload.kind) else {
        return app_error(&AppError::Validation(
            "unknown ledger line kind; expected deposit, disbursement, or journal".to_string(),
        ));
    };

    let accounts = BankAccountRepository::new((*state.db).clone());
    if let Err(e) = accounts.require(account_id).await {
        return account_error_response(&e);
    }

    let repo = LedgerLineRepository::new((*state.db).clone());
    let input = CreateLedgerLineInput {
        bank_account_id: account_id,
        line_date: payload.line_date,
        description: payload.description,
        amount: payload.amount,
        kind,
    };

    match repo.create(input).await {
        Ok(line) => {
            info!(line_id = %line.id, %account_id, "ledger line created");
            (StatusCode::CREATED, Json(LedgerLineResponse::from(line))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/bank-accounts/{account_id}/ledger-lines` - Unmatched lines in a window.
async fn list_unmatched_lines(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(window): Query<CandidateWindow>,
) -> Response {
    let repo = LedgerLineRepository::new((*state.db).clone());

    match repo.list_unmatched(account_id, window.from, window.to).await {
        Ok(lines) => {
            let data: Vec<LedgerLineResponse> =
                lines.into_iter().map(LedgerLineResponse::from).collect();
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/ledger-lines/{id}` - Get a ledger line.
async fn get_ledger_line(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = LedgerLineRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(Some(line)) => (StatusCode::OK, Json(LedgerLineResponse::from(line))).into_response(),
        Ok(None) => error_response(&LedgerError::NotFound(id)),
        Err(e) => error_response(&e),
    }
}

fn account_error_response(e: &BankAccountError) -> Response {
    match e {
        BankAccountError::NotFound(id) => {
            app_error(&AppError::NotFound(format!("bank account {id}")))
        }
        BankAccountError::Database(err) => {
            error!(error = %err, "bank account lookup failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}

/// Maps a ledger error to an HTTP response.
fn error_response(e: &LedgerError) -> Response {
    match e {
        LedgerError::NotFound(id) => app_error(&AppError::NotFound(format!("ledger line {id}"))),
        LedgerError::Database(err) => {
            error!(error = %err, "ledger line operation failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("deposit"), Some(LedgerLineKind::Deposit));
        assert_eq!(
            parse_kind("disbursement"),
            Some(LedgerLineKind::Disbursement)
        );
        assert_eq!(parse_kind("journal"), Some(LedgerLineKind::Journal));
        assert_eq!(parse_kind("transfer"), None);
        assert_eq!(parse_kind(""), None);
    }

    #[test]
    fn test_kind_name_round_trip() {
        for kind in [
            LedgerLineKind::Deposit,
            LedgerLineKind::Disbursement,
            LedgerLineKind::Journal,
        ] {
            assert_eq!(parse_kind(kind_name(kind)), Some(kind));
        }
    }
}
