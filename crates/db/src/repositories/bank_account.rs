//! Bank account repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use fundra_shared::types::PageRequest;

use crate::entities::bank_accounts;

/// Error types for bank account operations.
#[derive(Debug, thiserror::Error)]
pub enum BankAccountError {
    /// Bank account not found.
    #[error("bank account not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateBankAccountInput {
    /// Display name.
    pub name: String,
    /// Bank institution name.
    pub bank_name: String,
    /// Full account number; only the masked form is stored.
    pub account_number: String,
    /// Routing number.
    pub routing_number: Option<String>,
    /// Linked general-ledger account.
    pub gl_account_id: Uuid,
    /// Starting balance.
    pub current_balance: Decimal,
}

/// Bank account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BankAccountRepository {
    db: DatabaseConnection,
}

impl BankAccountRepository {
    /// Creates a new bank account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new bank account, masking the account number.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        input: CreateBankAccountInput,
    ) -> Result<bank_accounts::Model, BankAccountError> {
        let now = chrono::Utc::now().into();
        let account = bank_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            bank_name: Set(input.bank_name),
            account_number_masked: Set(mask_account_number(&input.account_number)),
            routing_number: Set(input.routing_number),
            gl_account_id: Set(input.gl_account_id),
            current_balance: Set(input.current_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let account = account.insert(&self.db).await?;
        Ok(account)
    }

    /// Finds a bank account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<bank_accounts::Model>, BankAccountError> {
        let account = bank_accounts::Entity::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }

    /// Finds a bank account by ID, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the account does not exist.
    pub async fn require(&self, id: Uuid) -> Result<bank_accounts::Model, BankAccountError> {
        self.find_by_id(id)
            .await?
            .ok_or(BankAccountError::NotFound(id))
    }

    /// Lists bank accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<bank_accounts::Model>, u64), BankAccountError> {
        let total = bank_accounts::Entity::find().count(&self.db).await?;

        let accounts = bank_accounts::Entity::find()
            .order_by_asc(bank_accounts::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((accounts, total))
    }

    /// Counts open (non-closed) reconciliations for an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_open_reconciliations(&self, id: Uuid) -> Result<u64, BankAccountError> {
        use crate::entities::reconciliations;
        use crate::entities::sea_orm_active_enums::ReconciliationStatus;

        let count = reconciliations::Entity::find()
            .filter(reconciliations::Column::BankAccountId.eq(id))
            .filter(reconciliations::Column::Status.ne(ReconciliationStatus::Closed))
            .count(&self.db)
            .await?;

        Ok(count)
    }
}

/// Masks an account number down to its last four digits.
///
/// Numbers of four digits or fewer are masked entirely.
#[must_use]
pub fn mask_account_number(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", &digits[digits.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mask_account_number() {
        assert_eq!(mask_account_number("123456789"), "****6789");
        assert_eq!(mask_account_number("1234-5678"), "****5678");
        assert_eq!(mask_account_number("1234"), "****");
        assert_eq!(mask_account_number(""), "****");
    }

    proptest! {
        #[test]
        fn prop_mask_never_reveals_more_than_four_digits(number in "[0-9 -]{0,30}") {
            let masked = mask_account_number(&number);
            let digit_count = masked.chars().filter(char::is_ascii_digit).count();
            prop_assert!(digit_count <= 4);
            prop_assert!(masked.starts_with("****"));
        }
    }
}
