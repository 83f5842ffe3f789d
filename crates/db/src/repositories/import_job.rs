//! Import job repository.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use uuid::Uuid;

use crate::entities::import_jobs;

/// Error types for import job lookups.
#[derive(Debug, thiserror::Error)]
pub enum ImportJobError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Read-side repository for durable import job records.
///
/// Jobs are written by `StatementRepository::import_transactions`.
#[derive(Debug, Clone)]
pub struct ImportJobRepository {
    db: DatabaseConnection,
}

impl ImportJobRepository {
    /// Creates a new import job repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an import job by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<import_jobs::Model>, ImportJobError> {
        let job = import_jobs::Entity::find_by_id(id).one(&self.db).await?;
        Ok(job)
    }
}
