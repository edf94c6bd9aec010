//! Repository for the `corrections` table.

use nahw_core::types::DbId;
use sqlx::PgPool;

use crate::models::correction::{CorrectionRecord, CreateCorrection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, original_text, corrected_text, created_at";

/// Provides create / list / find / delete for correction records.
pub struct CorrectionRepo;

impl CorrectionRepo {
    /// Insert a new correction, returning the created row with its
    /// database-assigned `id` and `created_at`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCorrection,
    ) -> Result<CorrectionRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO corrections (original_text, corrected_text) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CorrectionRecord>(&query)
            .bind(&input.original_text)
            .bind(&input.corrected_text)
            .fetch_one(pool)
            .await
    }

    /// Find a correction by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CorrectionRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM corrections WHERE id = $1");
        sqlx::query_as::<_, CorrectionRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every correction, newest first.
    ///
    /// `id` breaks ties between rows created within the same microsecond.
    pub async fn list(pool: &PgPool) -> Result<Vec<CorrectionRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM corrections ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, CorrectionRecord>(&query)
            .fetch_all(pool)
            .await
    }

    /// Permanently delete a correction. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM corrections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
