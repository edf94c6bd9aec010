//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use nahw_api::error::AppError;
use nahw_api::orchestrator::SubmitError;
use nahw_core::correction::ValidationFailure;
use nahw_core::error::CoreError;
use nahw_db::store::StorageError;
use nahw_engine::device::DeviceKind;
use nahw_engine::error::CorrectionError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Correction",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Correction with id 42 not found");
}

// ---------------------------------------------------------------------------
// Test: StorageError::NotFound maps to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storage_not_found_returns_404() {
    let (status, json) = error_to_response(StorageError::NotFound { id: 3 }.into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Correction with id 3 not found");
}

// ---------------------------------------------------------------------------
// Test: database failures are sanitized
// ---------------------------------------------------------------------------

#[tokio::test]
async fn database_error_returns_sanitized_500() {
    let err = AppError::Storage(StorageError::Database(sqlx::Error::PoolTimedOut));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: validation failures carry the violated constraint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_failure_returns_400_with_details() {
    let err = AppError::Submit(SubmitError::Validation(ValidationFailure::TooLong {
        length: 5001,
        max: 5000,
    }));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"],
        "Text length 5001 exceeds the maximum of 5000 characters"
    );
    assert_eq!(json["details"]["constraint"], "too_long");
}

// ---------------------------------------------------------------------------
// Test: model not loaded maps to 503
// ---------------------------------------------------------------------------

#[tokio::test]
async fn model_not_loaded_returns_503() {
    let (status, json) = error_to_response(SubmitError::ModelNotLoaded.into()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "MODEL_NOT_LOADED");
}

// ---------------------------------------------------------------------------
// Test: correction failure hides backend detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn correction_failure_returns_500_without_backend_detail() {
    let err = SubmitError::Correction(CorrectionError::Generation {
        device: DeviceKind::Metal,
        message: "shape mismatch in matmul".to_string(),
    });

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CORRECTION_FAILED");
    assert!(!json.to_string().contains("matmul"));
}

// ---------------------------------------------------------------------------
// Test: unsaved correction returns the computed pair
// ---------------------------------------------------------------------------

#[tokio::test]
async fn persistence_failure_returns_data() {
    let err = SubmitError::Persistence {
        source: StorageError::Unavailable("connection refused".to_string()),
        original_text: "ذهبو".to_string(),
        corrected_text: "ذهبوا".to_string(),
    };
    assert_eq!(err.kind(), "storage");

    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CORRECTION_NOT_SAVED");
    assert_eq!(json["data"]["original_text"], "ذهبو");
    assert_eq!(json["data"]["corrected_text"], "ذهبوا");
    assert!(!json.to_string().contains("connection refused"));
}

// ---------------------------------------------------------------------------
// Test: BadRequest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::BadRequest("ID must be greater than 0".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "ID must be greater than 0");
    assert_matches!(json.get("details"), None);
}
