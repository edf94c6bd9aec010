use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use nahw_core::types::Timestamp;
use nahw_engine::device::DeviceKind;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when both the store and the model are ready, else `degraded`.
    pub status: &'static str,
    pub timestamp: Timestamp,
    pub model_loaded: bool,
    /// Whether the store is reachable.
    pub db_healthy: bool,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Device the model is bound to; `null` while loading.
    pub device: Option<DeviceKind>,
    pub model: Option<String>,
}

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.orchestrator.engine().get();
    let db_healthy = state.orchestrator.store_healthy().await;
    let model_loaded = engine.is_some();

    let status = if db_healthy && model_loaded {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        timestamp: chrono::Utc::now(),
        model_loaded,
        db_healthy,
        version: env!("CARGO_PKG_VERSION"),
        device: engine.as_ref().map(|e| e.device()),
        model: engine.as_ref().map(|e| e.model_name().to_string()),
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
