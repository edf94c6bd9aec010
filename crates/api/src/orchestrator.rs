//! End-to-end handling of one correction submission.
//!
//! [`CorrectionOrchestrator::submit`] validates the raw text, runs the
//! engine, and persists the pair. It never writes a partial record and
//! never turns a failure into a success: each step's failure surfaces as a
//! distinct [`SubmitError`] variant. When the engine succeeds but the write
//! fails, the computed pair is returned inside the error so the caller can
//! still show it.

use std::sync::Arc;

use nahw_core::correction::{char_length, validate_submission, ValidationFailure};
use nahw_core::types::DbId;
use nahw_db::models::correction::{CorrectionRecord, CreateCorrection};
use nahw_db::store::{CorrectionStore, StorageError};
use nahw_engine::error::CorrectionError;
use nahw_engine::EngineSlot;

/// Why a submission produced no stored record.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The engine is still loading.
    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error(transparent)]
    Correction(#[from] CorrectionError),

    /// The correction was computed but could not be stored.
    #[error("Correction computed but not saved: {source}")]
    Persistence {
        #[source]
        source: StorageError,
        original_text: String,
        corrected_text: String,
    },

    /// The blocking correction task did not complete.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    /// Short machine-readable failure kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Validation(_) => "validation",
            SubmitError::ModelNotLoaded => "model_not_loaded",
            SubmitError::Correction(err) => err.kind(),
            SubmitError::Persistence { .. } => "storage",
            SubmitError::Internal(_) => "internal",
        }
    }
}

/// Coordinates the engine and the store for every correction request.
pub struct CorrectionOrchestrator {
    store: Arc<dyn CorrectionStore>,
    engine: EngineSlot,
    max_text_length: usize,
}

impl CorrectionOrchestrator {
    pub fn new(store: Arc<dyn CorrectionStore>, engine: EngineSlot, max_text_length: usize) -> Self {
        Self {
            store,
            engine,
            max_text_length,
        }
    }

    /// Validate, correct and persist `raw_text`.
    ///
    /// The stored `original_text` is exactly `raw_text`; trimming applies
    /// only to the emptiness check.
    pub async fn submit(&self, raw_text: String) -> Result<CorrectionRecord, SubmitError> {
        let input_chars = char_length(&raw_text);

        if let Err(failure) = validate_submission(&raw_text, self.max_text_length) {
            tracing::info!(input_chars, kind = "validation", reason = %failure, "Submission rejected");
            return Err(failure.into());
        }

        let Some(engine) = self.engine.get() else {
            tracing::warn!(input_chars, kind = "model_not_loaded", "Submission received before model finished loading");
            return Err(SubmitError::ModelNotLoaded);
        };
        let device = engine.device();

        let text = raw_text.clone();
        let corrected_text = tokio::task::spawn_blocking(move || engine.correct(&text))
            .await
            .map_err(|e| SubmitError::Internal(format!("correction task failed: {e}")))?
            .inspect_err(|err| {
                tracing::error!(
                    input_chars,
                    device = %device,
                    kind = err.kind(),
                    error = %err,
                    "Correction failed"
                );
            })?;

        let input = CreateCorrection {
            original_text: raw_text,
            corrected_text,
        };

        match self.store.create(&input).await {
            Ok(record) => {
                tracing::info!(
                    id = record.id,
                    input_chars,
                    output_chars = char_length(&record.corrected_text),
                    device = %device,
                    "Correction stored"
                );
                Ok(record)
            }
            Err(source) => {
                tracing::error!(
                    input_chars,
                    device = %device,
                    kind = "storage",
                    error = %source,
                    "Correction computed but not saved"
                );
                Err(SubmitError::Persistence {
                    source,
                    original_text: input.original_text,
                    corrected_text: input.corrected_text,
                })
            }
        }
    }

    /// All records, newest first.
    pub async fn list_all(&self) -> Result<Vec<CorrectionRecord>, StorageError> {
        self.store.list_all().await
    }

    pub async fn find(&self, id: DbId) -> Result<Option<CorrectionRecord>, StorageError> {
        self.store.find_by_id(id).await
    }

    /// Delete one record; an unknown id is [`StorageError::NotFound`].
    pub async fn delete(&self, id: DbId) -> Result<(), StorageError> {
        self.store.delete(id).await?;
        tracing::info!(id, "Correction deleted");
        Ok(())
    }

    pub fn engine(&self) -> &EngineSlot {
        &self.engine
    }

    pub async fn store_healthy(&self) -> bool {
        self.store.is_healthy().await
    }
}
