//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;
use fundra_shared::AppError;

pub mod bank_accounts;
pub mod health;
pub mod import_jobs;
pub mod ledger_lines;
pub mod reconciliations;
pub mod statements;

/// Renders an application error as the standard JSON error envelope.
pub(crate) fn app_error(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(bank_accounts::routes())
        .merge(ledger_lines::routes())
        .merge(statements::routes())
        .merge(reconciliations::routes())
        .merge(import_jobs::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_status() {
        let cases = [
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                AppError::Parse("row 3".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::Conflict("open".into()), StatusCode::CONFLICT),
            (
                AppError::Database("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(app_error(&err).status(), expected);
        }
    }
}
