//! Reconciliation session routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use fundra_core::matching::MatchParams;
use fundra_core::reconciliation::CreateReconciliationInput;
use fundra_db::entities::{reconciliations, sea_orm_active_enums::ReconciliationStatus};
use fundra_db::repositories::reconciliation::{ReconciliationRepository, SessionError};
use fundra_shared::AppError;

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reconciliations", post(create_reconciliation))
        .route("/reconciliations/{id}", get(get_reconciliation))
        .route("/reconciliations/{id}/match", post(match_transaction))
        .route("/reconciliations/{id}/unmatch", post(unmatch_transaction))
        .route("/reconciliations/{id}/auto-match", post(auto_match))
        .route("/reconciliations/{id}/close", post(close_reconciliation))
}

/// Request body for creating a reconciliation.
#[derive(Debug, Deserialize)]
pub struct CreateReconciliationRequest {
    /// The bank account being reconciled.
    pub bank_account_id: Uuid,
    /// The statement to reconcile against.
    pub statement_id: Uuid,
    /// Reconciliation date.
    pub reconciliation_date: NaiveDate,
    /// Balance per internal records.
    pub book_balance: Decimal,
    /// Balance reported by the bank.
    pub statement_balance: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request body for a manual match.
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    /// Statement transaction to match.
    pub transaction_id: Uuid,
    /// Ledger line to match it to.
    pub ledger_line_id: Uuid,
}

/// Request body for an unmatch.
#[derive(Debug, Deserialize)]
pub struct UnmatchRequest {
    /// Statement transaction to unmatch.
    pub transaction_id: Uuid,
}

/// Response for a reconciliation session.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    /// Session ID.
    pub id: Uuid,
    /// The bank account being reconciled.
    pub bank_account_id: Uuid,
    /// The statement reconciled against.
    pub statement_id: Uuid,
    /// Reconciliation date.
    pub reconciliation_date: NaiveDate,
    /// Statement opening balance snapshot.
    pub start_balance: Decimal,
    /// Statement closing balance snapshot.
    pub end_balance: Decimal,
    /// Balance per internal records.
    pub book_balance: Decimal,
    /// Balance reported by the bank.
    pub statement_balance: Decimal,
    /// Unexplained difference.
    pub difference: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Session status.
    pub status: String,
}

impl From<reconciliations::Model> for ReconciliationResponse {
    fn from(model: reconciliations::Model) -> Self {
        Self {
            id: model.id,
            bank_account_id: model.bank_account_id,
            statement_id: model.statement_id,
            reconciliation_date: model.reconciliation_date,
            start_balance: model.start_balance,
            end_balance: model.end_balance,
            book_balance: model.book_balance,
            statement_balance: model.statement_balance,
            difference: model.difference,
            notes: model.notes,
            status: status_name(model.status).to_string(),
        }
    }
}

fn status_name(status: ReconciliationStatus) -> &'static str {
    match status {
        ReconciliationStatus::Created => "created",
        ReconciliationStatus::InProgress => "in_progress",
        ReconciliationStatus::Balanced => "balanced",
        ReconciliationStatus::Closed => "closed",
    }
}

/// POST `/reconciliations` - Create a reconciliation session.
async fn create_reconciliation(
    State(state): State<AppState>,
    Json(payload): Json<CreateReconciliationRequest>,
) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    let input = CreateReconciliationInput {
        bank_account_id: payload.bank_account_id,
        statement_id: payload.statement_id,
        reconciliation_date: payload.reconciliation_date,
        book_balance: payload.book_balance,
        statement_balance: payload.statement_balance,
        notes: payload.notes,
    };

    match repo.create(input).await {
        Ok(session) => {
            info!(reconciliation_id = %session.id, "reconciliation created");
            (
                StatusCode::CREATED,
                Json(ReconciliationResponse::from(session)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/reconciliations/{id}` - Current balances, difference, status, counts.
async fn get_reconciliation(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.detail(id).await {
        Ok(detail) => {
            let session = ReconciliationResponse::from(detail.reconciliation);
            (
                StatusCode::OK,
                Json(json!({
                    "reconciliation": session,
                    "matched_count": detail.matched_count,
                    "unmatched_count": detail.unmatched_count
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/reconciliations/{id}/match` - Manually match a transaction.
async fn match_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MatchRequest>,
) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo
        .match_transaction(id, payload.transaction_id, payload.ledger_line_id)
        .await
    {
        Ok(session) => (StatusCode::OK, Json(ReconciliationResponse::from(session))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/reconciliations/{id}/unmatch` - Unmatch a transaction (idempotent).
async fn unmatch_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UnmatchRequest>,
) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.unmatch_transaction(id, payload.transaction_id).await {
        Ok(session) => (StatusCode::OK, Json(ReconciliationResponse::from(session))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/reconciliations/{id}/auto-match` - Run the greedy matching pass.
async fn auto_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<MatchParams>,
) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.auto_match(id, params).await {
        Ok((session, matches)) => (
            StatusCode::OK,
            Json(json!({
                "reconciliation": ReconciliationResponse::from(session),
                "matches": matches
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST `/reconciliations/{id}/close` - Close a balanced session.
async fn close_reconciliation(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.close(id).await {
        Ok(session) => {
            info!(reconciliation_id = %id, "reconciliation closed");
            (StatusCode::OK, Json(ReconciliationResponse::from(session))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Maps a session error to an HTTP response.
fn error_response(e: &SessionError) -> Response {
    match e {
        SessionError::Reconciliation(err) => {
            let status = StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({
                    "error": err.error_code(),
                    "message": err.to_string()
                })),
            )
                .into_response()
        }
        SessionError::Database(err) => {
            error!(error = %err, "reconciliation operation failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_name() {
        assert_eq!(status_name(ReconciliationStatus::Created), "created");
        assert_eq!(status_name(ReconciliationStatus::InProgress), "in_progress");
        assert_eq!(status_name(ReconciliationStatus::Balanced), "balanced");
        assert_eq!(status_name(ReconciliationStatus::Closed), "closed");
    }
}
