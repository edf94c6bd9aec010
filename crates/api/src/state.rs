use std::sync::Arc;

use nahw_db::store::CorrectionStore;
use nahw_engine::EngineSlot;

use crate::config::ServerConfig;
use crate::orchestrator::CorrectionOrchestrator;
use crate::views::Views;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Validation, correction and persistence for every submission.
    pub orchestrator: Arc<CorrectionOrchestrator>,
    pub config: Arc<ServerConfig>,
    /// Compiled HTML templates.
    pub views: Arc<Views>,
}

impl AppState {
    /// Wire the store and the (possibly still empty) engine slot together.
    pub fn new(
        store: Arc<dyn CorrectionStore>,
        engine: EngineSlot,
        config: ServerConfig,
    ) -> Result<Self, tera::Error> {
        let orchestrator = CorrectionOrchestrator::new(store, engine, config.max_text_length);
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
        })
    }
}
