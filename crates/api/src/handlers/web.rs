//! Handlers for the server-rendered pages.
//!
//! These consume the same orchestrator as the JSON API. Submission failures
//! re-render the form with a banner and the user's text instead of an error
//! status page.

use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use nahw_core::correction::ValidationFailure;
use nahw_core::types::DbId;
use nahw_db::store::StorageError;
use serde::Deserialize;

use crate::error::AppResult;
use crate::orchestrator::SubmitError;
use crate::state::AppState;
use crate::views::{CorrectionPage, STYLESHEET};

const NOT_SAVED_NOTICE: &str = "تم تصحيح النص لكن تعذّر حفظه في السجل.";

#[derive(Debug, Deserialize)]
pub struct CorrectionForm {
    pub text: String,
}

/// GET /
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(state.views.index(None, None)?))
}

/// POST /correct
pub async fn correct(
    State(state): State<AppState>,
    Form(form): Form<CorrectionForm>,
) -> AppResult<Html<String>> {
    let html = match state.orchestrator.submit(form.text.clone()).await {
        Ok(record) => state.views.correction(&CorrectionPage {
            original_text: &record.original_text,
            corrected_text: &record.corrected_text,
            correction_id: Some(record.id),
            notice: None,
        })?,
        Err(SubmitError::Persistence {
            original_text,
            corrected_text,
            ..
        }) => state.views.correction(&CorrectionPage {
            original_text: &original_text,
            corrected_text: &corrected_text,
            correction_id: None,
            notice: Some(NOT_SAVED_NOTICE),
        })?,
        Err(err) => state
            .views
            .index(Some(&form.text), Some(&banner_for(&err)))?,
    };
    Ok(Html(html))
}

/// GET /history
pub async fn history(State(state): State<AppState>) -> AppResult<Html<String>> {
    let records = state.orchestrator.list_all().await?;
    Ok(Html(state.views.history(&records)?))
}

/// POST /delete/{id}
///
/// Always redirects back to the history page; failures are logged.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> Redirect {
    if id <= 0 {
        tracing::warn!(id, "Ignoring delete for invalid id");
    } else {
        match state.orchestrator.delete(id).await {
            Ok(()) => {}
            Err(StorageError::NotFound { id }) => {
                tracing::warn!(id, "Delete requested for missing correction");
            }
            Err(err) => {
                tracing::error!(id, error = %err, "Failed to delete correction");
            }
        }
    }
    Redirect::to("/history")
}

/// GET /static/style.css
pub async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// User-facing banner text for a failed submission.
fn banner_for(err: &SubmitError) -> String {
    match err {
        SubmitError::Validation(ValidationFailure::Empty) => {
            "النص فارغ. الرجاء إدخال نص للتصحيح.".to_string()
        }
        SubmitError::Validation(ValidationFailure::TooLong { length, max }) => {
            format!("طول النص {length} حرفًا ويتجاوز الحد الأقصى {max} حرف.")
        }
        SubmitError::ModelNotLoaded => "النموذج قيد التحميل، يرجى المحاولة بعد قليل.".to_string(),
        SubmitError::Correction(_) => "تعذّر تصحيح النص. يرجى المحاولة مرة أخرى.".to_string(),
        SubmitError::Persistence { .. } => NOT_SAVED_NOTICE.to_string(),
        SubmitError::Internal(_) => "حدث خطأ داخلي. يرجى المحاولة مرة أخرى.".to_string(),
    }
}
