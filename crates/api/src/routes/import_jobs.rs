//! Import job status routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use fundra_db::entities::{import_jobs, sea_orm_active_enums::ImportJobStatus};
use fundra_db::repositories::import_job::{ImportJobError, ImportJobRepository};
use fundra_shared::AppError;

/// Creates the import job routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/import-jobs/{id}", get(get_import_job))
}

/// Response for an import job.
#[derive(Debug, Serialize)]
pub struct ImportJobResponse {
    /// Job ID.
    pub id: Uuid,
    /// Statement the import targeted.
    pub statement_id: Uuid,
    /// Job status.
    pub status: String,
    /// Rows inserted on success.
    pub inserted_rows: i32,
    /// Failure detail, when the import did not complete.
    pub error_message: Option<String>,
}

impl From<import_jobs::Model> for ImportJobResponse {
    fn from(model: import_jobs::Model) -> Self {
        let status = match model.status {
            ImportJobStatus::Processing => "processing",
            ImportJobStatus::Completed => "completed",
            ImportJobStatus::Failed => "failed",
            ImportJobStatus::RolledBack => "rolled_back",
        };
        Self {
            id: model.id,
            statement_id: model.statement_id,
            status: status.to_string(),
            inserted_rows: model.inserted_rows,
            error_message: model.error_message,
        }
    }
}

/// GET `/import-jobs/{id}` - Durable job status.
async fn get_import_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = ImportJobRepository::new((*state.db).clone());

    match repo.find_by_id(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(ImportJobResponse::from(job))).into_response(),
        Ok(None) => app_error(&AppError::NotFound(format!("import job {id}"))),
        Err(ImportJobError::Database(err)) => {
            error!(error = %err, "import job lookup failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}
