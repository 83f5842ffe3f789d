//! Statement ingestion routes: upload, import, and listing.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use fundra_core::statement::{StatementFormat, UploadStatementInput};
use fundra_shared::AppError;
use fundra_db::entities::{bank_statements, statement_transactions};
use fundra_db::repositories::statement::{IngestionError, StatementRepository};
use fundra_shared::types::{PageRequest, PageResponse};

/// Creates the statement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts/{id}/statements", post(upload_statement))
        .route("/bank-accounts/{id}/statements", get(list_statements))
        .route("/statements/{id}", get(get_statement))
        .route("/statements/{id}/transactions", get(list_transactions))
        .route("/statements/{id}/import", post(import_transactions))
}

/// Request body for uploading a statement.
#[derive(Debug, Deserialize)]
pub struct UploadStatementRequest {
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Period start (inclusive).
    pub period_start: NaiveDate,
    /// Period end (inclusive).
    pub period_end: NaiveDate,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Closing balance.
    pub closing_balance: Decimal,
}

/// Response for a statement.
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    /// Statement ID.
    pub id: Uuid,
    /// Owning bank account.
    pub bank_account_id: Uuid,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Period start.
    pub period_start: NaiveDate,
    /// Period end.
    pub period_end: NaiveDate,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Closing balance.
    pub closing_balance: Decimal,
    /// Lifecycle status.
    pub status: String,
    /// Storage key of the archived raw file.
    pub file_key: Option<String>,
}

impl From<bank_statements::Model> for StatementResponse {
    fn from(model: bank_statements::Model) -> Self {
        let status = match model.status {
            fundra_db::entities::sea_orm_active_enums::StatementStatus::Uploaded => "uploaded",
            fundra_db::entities::sea_orm_active_enums::StatementStatus::Processed => "processed",
        };
        Self {
            id: model.id,
            bank_account_id: model.bank_account_id,
            statement_date: model.statement_date,
            period_start: model.period_start,
            period_end: model.period_end,
            opening_balance: model.opening_balance,
            closing_balance: model.closing_balance,
            status: status.to_string(),
            file_key: model.file_key,
        }
    }
}

/// Response for a statement transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Position within the source file.
    pub row_index: i32,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Signed amount.
    pub amount: Decimal,
    /// Linked ledger line, when matched.
    pub matched_ledger_line_id: Option<Uuid>,
}

impl From<statement_transactions::Model> for TransactionResponse {
    fn from(model: statement_transactions::Model) -> Self {
        Self {
            id: model.id,
            row_index: model.row_index,
            transaction_date: model.transaction_date,
            description: model.description,
            amount: model.amount,
            matched_ledger_line_id: model.matched_ledger_line_id,
        }
    }
}

/// POST `/bank-accounts/{account_id}/statements` - Upload statement metadata.
async fn upload_statement(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<UploadStatementRequest>,
) -> Response {
    let repo = StatementRepository::new((*state.db).clone());

    let input = UploadStatementInput {
        bank_account_id: account_id,
        statement_date: payload.statement_date,
        period_start: payload.period_start,
        period_end: payload.period_end,
        opening_balance: payload.opening_balance,
        closing_balance: payload.closing_balance,
    };

    match repo.create_statement(input, None).await {
        Ok(statement) => {
            info!(statement_id = %statement.id, %account_id, "statement uploaded");
            (StatusCode::CREATED, Json(StatementResponse::from(statement))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/bank-accounts/{account_id}/statements` - List statements.
async fn list_statements(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = StatementRepository::new((*state.db).clone());

    match repo.list_for_account(account_id, &page).await {
        Ok((statements, total)) => {
            let data: Vec<StatementResponse> =
                statements.into_iter().map(StatementResponse::from).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/statements/{id}` - Get a statement.
async fn get_statement(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = StatementRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(Some(statement)) => {
            (StatusCode::OK, Json(StatementResponse::from(statement))).into_response()
        }
        Ok(None) => not_found_response(id),
        Err(e) => error_response(&e),
    }
}

/// GET `/statements/{id}/transactions` - List imported transactions.
async fn list_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = StatementRepository::new((*state.db).clone());

    match repo.list_transactions(id, &page).await {
        Ok((transactions, total)) => {
            let data: Vec<TransactionResponse> = transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// One multipart import request, decoded.
struct ImportUpload {
    bytes: Bytes,
    filename: Option<String>,
    format: Option<String>,
}

/// POST `/statements/{id}/import` - Import transactions from a file.
///
/// Multipart request with a `file` part and an optional `format` part
/// (`csv`, `ofx`, or `qfx`; inferred from the filename extension when
/// omitted). All-or-nothing: a single bad row aborts the whole import.
async fn import_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Response {
    let upload = match read_import_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let Some(format) = infer_format(upload.format.as_deref(), upload.filename.as_deref()) else {
        return app_error(&AppError::Validation(
            "unknown statement format; expected csv, ofx, or qfx".to_string(),
        ));
    };

    let repo = StatementRepository::new((*state.db).clone());
    match repo.import_transactions(id, &upload.bytes, format).await {
        Ok(outcome) => {
            archive_file(&state, &repo, id, &upload).await;
            info!(statement_id = %id, inserted = outcome.inserted, "transactions imported");
            (
                StatusCode::OK,
                Json(json!({
                    "job_id": outcome.job_id,
                    "inserted": outcome.inserted
                })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Archives the raw file and records its key; failures are logged, not fatal.
async fn archive_file(
    state: &AppState,
    repo: &StatementRepository,
    statement_id: Uuid,
    upload: &ImportUpload,
) {
    let Some(archive) = &state.archive else {
        return;
    };

    let filename = upload.filename.as_deref().unwrap_or("statement");
    match archive
        .store(statement_id, filename, upload.bytes.clone())
        .await
    {
        Ok(archived) => {
            if let Err(e) = repo.set_file_key(statement_id, archived.storage_key).await {
                warn!(error = %e, %statement_id, "failed to record statement file key");
            }
        }
        Err(e) => {
            warn!(error = %e, %statement_id, "failed to archive statement file");
        }
    }
}

/// Decodes the multipart body of an import request.
async fn read_import_upload(mut multipart: Multipart) -> Result<ImportUpload, Response> {
    let mut bytes = None;
    let mut filename = None;
    let mut format = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                match field.bytes().await {
                    Ok(data) => bytes = Some(data),
                    Err(e) => {
                        return Err(app_error(&AppError::Validation(format!(
                            "failed to read file part: {e}"
                        ))));
                    }
                }
            }
            Some("format") => {
                format = field.text().await.ok();
            }
            _ => {}
        }
    }

    let Some(bytes) = bytes else {
        return Err(app_error(&AppError::Validation(
            "missing 'file' part".to_string(),
        )));
    };

    Ok(ImportUpload {
        bytes,
        filename,
        format,
    })
}

/// Resolves the statement format from an explicit `format` part, falling back
/// to the filename extension.
fn infer_format(format: Option<&str>, filename: Option<&str>) -> Option<StatementFormat> {
    let name = format
        .map(str::to_string)
        .or_else(|| filename.and_then(|f| f.rsplit('.').next().map(str::to_string)))?;
    StatementFormat::from_str(&name).ok()
}

fn not_found_response(id: Uuid) -> Response {
    app_error(&AppError::NotFound(format!("statement {id}")))
}

/// Maps an ingestion error to an HTTP response.
fn error_response(e: &IngestionError) -> Response {
    match e {
        IngestionError::Statement(err) => {
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
        IngestionError::Database(err) => {
            error!(error = %err, "statement operation failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("csv"), None, Some(StatementFormat::Csv))]
    #[case(Some("OFX"), None, Some(StatementFormat::Ofx))]
    #[case(None, Some("march.qfx"), Some(StatementFormat::Qfx))]
    #[case(None, Some("statement.2026-03.csv"), Some(StatementFormat::Csv))]
    #[case(Some("csv"), Some("march.ofx"), Some(StatementFormat::Csv))]
    #[case(None, Some("noextension"), None)]
    #[case(Some("xlsx"), None, None)]
    #[case(None, None, None)]
    fn test_infer_format(
        #[case] format: Option<&str>,
        #[case] filename: Option<&str>,
        #[case] expected: Option<StatementFormat>,
    ) {
        assert_eq!(infer_format(format, filename), expected);
    }
}
