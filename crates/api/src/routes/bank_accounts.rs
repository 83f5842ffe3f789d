//! Bank account routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::app_error;
use fundra_db::repositories::bank_account::{
    BankAccountError, BankAccountRepository, CreateBankAccountInput,
};
use fundra_shared::AppError;
use fundra_shared::types::{PageRequest, PageResponse};

/// Creates the bank account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bank-accounts", get(list_bank_accounts))
        .route("/bank-accounts", post(create_bank_account))
        .route("/bank-accounts/{id}", get(get_bank_account))
}

/// Request body for creating a bank account.
#[derive(Debug, Deserialize)]
pub struct CreateBankAccountRequest {
    /// Display name.
    pub name: String,
    /// Bank institution name.
    pub bank_name: String,
    /// Full account number; stored masked.
    pub account_number: String,
    /// Routing number.
    pub routing_number: Option<String>,
    /// Linked general-ledger account.
    pub gl_account_id: Uuid,
    /// Starting balance (default: 0).
    pub current_balance: Option<Decimal>,
}

/// Response for a bank account.
#[derive(Debug, Serialize)]
pub struct BankAccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Bank institution name.
    pub bank_name: String,
    /// Masked account number.
    pub account_number_masked: String,
    /// Routing number.
    pub routing_number: Option<String>,
    /// Linked general-ledger account.
    pub gl_account_id: Uuid,
    /// Current balance.
    pub current_balance: Decimal,
}

impl From<fundra_db::entities::bank_accounts::Model> for BankAccountResponse {
    fn from(model: fundra_db::entities::bank_accounts::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            bank_name: model.bank_name,
            account_number_masked: model.account_number_masked,
            routing_number: model.routing_number,
            gl_account_id: model.gl_account_id,
            current_balance: model.current_balance,
        }
    }
}

/// GET `/bank-accounts` - List bank accounts.
async fn list_bank_accounts(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Response {
    let repo = BankAccountRepository::new((*state.db).clone());

    match repo.list(&page).await {
        Ok((accounts, total)) => {
            let data: Vec<BankAccountResponse> =
                accounts.into_iter().map(BankAccountResponse::from).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST `/bank-accounts` - Create a bank account.
async fn create_bank_account(
    State(state): State<AppState>,
    Json(payload): Json<CreateBankAccountRequest>,
) -> Response {
    let repo = BankAccountRepository::new((*state.db).clone());

    let input = CreateBankAccountInput {
        name: payload.name,
        bank_name: payload.bank_name,
        account_number: payload.account_number,
        routing_number: payload.routing_number,
        gl_account_id: payload.gl_account_id,
        current_balance: payload.current_balance.unwrap_or(Decimal::ZERO),
    };

    match repo.create(input).await {
        Ok(account) => {
            info!(account_id = %account.id, name = %account.name, "bank account created");
            (
                StatusCode::CREATED,
                Json(BankAccountResponse::from(account)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Detail response: account fields plus its open reconciliation count.
#[derive(Debug, Serialize)]
pub struct BankAccountDetailResponse {
    /// The account.
    #[serde(flatten)]
    pub account: BankAccountResponse,
    /// Number of non-closed reconciliations against this account.
    pub open_reconciliations: u64,
}

/// GET `/bank-accounts/{id}` - Get a bank account.
async fn get_bank_account(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let repo = BankAccountRepository::new((*state.db).clone());

    let account = match repo.require(id).await {
        Ok(account) => account,
        Err(e) => return error_response(&e),
    };
    match repo.count_open_reconciliations(id).await {
        Ok(open_reconciliations) => {
            let detail = BankAccountDetailResponse {
                account: BankAccountResponse::from(account),
                open_reconciliations,
            };
            (StatusCode::OK, Json(detail)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Maps a repository error to an HTTP response.
fn error_response(e: &BankAccountError) -> Response {
    match e {
        BankAccountError::NotFound(id) => {
            app_error(&AppError::NotFound(format!("bank account {id}")))
        }
        BankAccountError::Database(err) => {
            error!(error = %err, "bank account operation failed");
            app_error(&AppError::Database("operation failed".to_string()))
        }
    }
}
