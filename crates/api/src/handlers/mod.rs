pub mod corrections;
pub mod web;

use nahw_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Reject ids that can never name a record.
pub fn ensure_valid_id(id: DbId) -> AppResult<()> {
    if id > 0 {
        Ok(())
    } else {
        Err(AppError::BadRequest("ID must be greater than 0".to_string()))
    }
}
