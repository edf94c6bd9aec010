//! Persistence gateway for correction records.
//!
//! [`CorrectionStore`] is the contract the request orchestrator is written
//! against. [`PgCorrectionStore`] backs it with PostgreSQL through
//! [`CorrectionRepo`]; tests substitute an in-memory implementation.

use async_trait::async_trait;
use nahw_core::types::DbId;

use crate::models::correction::{CorrectionRecord, CreateCorrection};
use crate::repositories::CorrectionRepo;
use crate::DbPool;

/// Errors surfaced by a [`CorrectionStore`].
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record with this id exists.
    #[error("Correction with id {id} not found")]
    NotFound { id: DbId },

    /// The backing database failed (connectivity, constraint, ...).
    #[error("Storage failure: {0}")]
    Database(#[from] sqlx::Error),

    /// A non-database backend failed.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Typed CRUD contract over the single table of correction records.
///
/// Each call is atomic from the caller's perspective; the backing store owns
/// its own transaction and locking discipline.
#[async_trait]
pub trait CorrectionStore: Send + Sync {
    /// Persist a new record, assigning `id` and `created_at`.
    async fn create(&self, input: &CreateCorrection) -> Result<CorrectionRecord, StorageError>;

    /// All records ordered by `created_at` descending.
    async fn list_all(&self) -> Result<Vec<CorrectionRecord>, StorageError>;

    /// A single record, or `None` when the id is unknown.
    async fn find_by_id(&self, id: DbId) -> Result<Option<CorrectionRecord>, StorageError>;

    /// Remove a record. A missing id is reported as [`StorageError::NotFound`].
    async fn delete(&self, id: DbId) -> Result<(), StorageError>;

    /// Whether the backing store is currently reachable.
    async fn is_healthy(&self) -> bool;
}

/// [`CorrectionStore`] backed by the `corrections` table.
#[derive(Clone)]
pub struct PgCorrectionStore {
    pool: DbPool,
}

impl PgCorrectionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CorrectionStore for PgCorrectionStore {
    async fn create(&self, input: &CreateCorrection) -> Result<CorrectionRecord, StorageError> {
        let record = CorrectionRepo::create(&self.pool, input).await?;
        tracing::debug!(id = record.id, "Correction persisted");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<CorrectionRecord>, StorageError> {
        Ok(CorrectionRepo::list(&self.pool).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<CorrectionRecord>, StorageError> {
        Ok(CorrectionRepo::find_by_id(&self.pool, id).await?)
    }

    async fn delete(&self, id: DbId) -> Result<(), StorageError> {
        if CorrectionRepo::delete(&self.pool, id).await? {
            tracing::debug!(id, "Correction deleted");
            Ok(())
        } else {
            Err(StorageError::NotFound { id })
        }
    }

    async fn is_healthy(&self) -> bool {
        crate::health_check(&self.pool).await.is_ok()
    }
}
