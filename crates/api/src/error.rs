use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nahw_core::error::CoreError;
use nahw_db::store::StorageError;
use serde_json::{json, Value};

use crate::orchestrator::SubmitError;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{"error", "code"}` JSON bodies.
/// An unsaved correction additionally carries `"data"` with the computed
/// pair, and a validation failure carries `"details"` naming the constraint.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Malformed or missing JSON bodies get the same error shape as every
/// other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut extra: Option<(&str, Value)> = None;

        let (status, code, message) = match &self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),

            AppError::Storage(err) => classify_storage_error(err),

            AppError::Submit(err) => match err {
                SubmitError::Validation(failure) => {
                    extra = serde_json::to_value(failure).ok().map(|v| ("details", v));
                    (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        failure.to_string(),
                    )
                }
                SubmitError::ModelNotLoaded => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_NOT_LOADED",
                    "Model not loaded, the server is still initializing".to_string(),
                ),
                SubmitError::Correction(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRECTION_FAILED",
                    "The model could not correct this text".to_string(),
                ),
                SubmitError::Persistence {
                    original_text,
                    corrected_text,
                    ..
                } => {
                    extra = Some((
                        "data",
                        json!({
                            "original_text": original_text,
                            "corrected_text": corrected_text,
                        }),
                    ));
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "CORRECTION_NOT_SAVED",
                        "The correction was computed but could not be saved".to_string(),
                    )
                }
                SubmitError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal submission error");
                    internal()
                }
            },

            AppError::Template(err) => {
                tracing::error!(error = %err, "Template rendering failed");
                internal()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some((key, value)) = extra {
            body[key] = value;
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Map a store error to status, code and message.
///
/// - `NotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_storage_error(err: &StorageError) -> (StatusCode, &'static str, String) {
    match err {
        StorageError::NotFound { id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Correction with id {id} not found"),
        ),
        StorageError::Database(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        StorageError::Database(db_err) => {
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        StorageError::Unavailable(msg) => {
            tracing::error!(error = %msg, "Store unavailable");
            internal()
        }
    }
}
