//! Correction record model and DTOs.
//!
//! Records are append-only: there is no update DTO. Deletion is the only
//! mutation after creation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use nahw_core::types::{DbId, Timestamp};

/// A row from the `corrections` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: DbId,
    pub original_text: String,
    pub corrected_text: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a new correction. `id` and `created_at` are assigned
/// by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCorrection {
    pub original_text: String,
    pub corrected_text: String,
}
