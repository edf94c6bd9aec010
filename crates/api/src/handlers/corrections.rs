//! Handlers for the `/corrections` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nahw_core::error::CoreError;
use nahw_core::types::DbId;
use nahw_db::models::correction::CorrectionRecord;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_valid_id;
use crate::state::AppState;

/// Request body for a new correction.
#[derive(Debug, Deserialize)]
pub struct CorrectionRequest {
    pub text: String,
}

/// POST /api/corrections
///
/// Correct the submitted text and store the pair. Returns 201 with the
/// stored record, or 400 `BAD_REQUEST` when the body is not a JSON object
/// with a string `text`.
pub async fn create_correction(
    State(state): State<AppState>,
    payload: Result<Json<CorrectionRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CorrectionRecord>)> {
    let Json(input) = payload?;
    let record = state.orchestrator.submit(input.text).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/corrections
///
/// All corrections, newest first.
pub async fn list_corrections(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CorrectionRecord>>> {
    let records = state.orchestrator.list_all().await?;
    Ok(Json(records))
}

/// GET /api/corrections/{id}
pub async fn get_correction(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<CorrectionRecord>> {
    ensure_valid_id(id)?;
    let record = state
        .orchestrator
        .find(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Correction",
            id,
        }))?;
    Ok(Json(record))
}

/// DELETE /api/corrections/{id}
///
/// Returns 204 on success and 404 when the id is unknown.
pub async fn delete_correction(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_valid_id(id)?;
    state.orchestrator.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
