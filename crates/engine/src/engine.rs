//! Device selection at start-up and per-request CPU fallback.

use std::sync::{Arc, Mutex};

use crate::backend::{Generator, GeneratorLoader};
use crate::config::EngineConfig;
use crate::device::{initialization_order, request_plan, DeviceKind};
use crate::error::{CorrectionError, EngineError, GenerationError};
use crate::prompt::{extract_correction, format_prompt};

/// The capability the request orchestrator depends on.
///
/// Implementations are shared across requests and must be callable
/// concurrently; `correct` blocks until generation finishes.
pub trait Corrector: Send + Sync {
    /// Produce the corrected form of `text`.
    fn correct(&self, text: &str) -> Result<String, CorrectionError>;

    /// Device the model was bound to at start-up.
    fn device(&self) -> DeviceKind;

    /// Model identifier.
    fn model_name(&self) -> &str;
}

/// Typed outcome of one step of a request plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Decoded continuation.
    Completed(String),
    /// The device ran out of memory.
    ResourceExhausted(String),
    /// Any other failure.
    Failed(String),
}

impl From<Result<String, GenerationError>> for AttemptOutcome {
    fn from(result: Result<String, GenerationError>) -> Self {
        match result {
            Ok(continuation) => AttemptOutcome::Completed(continuation),
            Err(GenerationError::ResourceExhausted(msg)) => AttemptOutcome::ResourceExhausted(msg),
            Err(GenerationError::Failed(msg)) => AttemptOutcome::Failed(msg),
        }
    }
}

/// A pretrained GEC model bound to its best available device.
///
/// The primary generator is loaded once by [`initialize`](Self::initialize)
/// and reused for every request. When the primary is an accelerator, a CPU
/// generator is loaded the first time a request exhausts accelerator memory
/// and is kept for later fallbacks.
pub struct CorrectionEngine {
    model_name: String,
    max_new_tokens: usize,
    loader: Arc<dyn GeneratorLoader>,
    primary_device: DeviceKind,
    primary: Mutex<Box<dyn Generator>>,
    cpu_fallback: Mutex<Option<Box<dyn Generator>>>,
}

impl CorrectionEngine {
    /// Bind the model to the first device in priority order that loads.
    ///
    /// Each failed device is logged and skipped; only exhausting the whole
    /// order is an error.
    pub fn initialize(
        loader: Arc<dyn GeneratorLoader>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut attempts: Vec<(DeviceKind, String)> = Vec::new();

        for device in initialization_order(config.force_cpu) {
            match loader.load(device) {
                Ok(generator) => {
                    tracing::info!(
                        model = %config.model_name,
                        device = %device,
                        dtype = ?device.dtype(),
                        skipped = attempts.len(),
                        "Model loaded"
                    );
                    return Ok(Self {
                        model_name: config.model_name.clone(),
                        max_new_tokens: config.max_new_tokens,
                        loader,
                        primary_device: device,
                        primary: Mutex::new(generator),
                        cpu_fallback: Mutex::new(None),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        device = %device,
                        error = %err,
                        "Could not bind model to device, degrading to next option"
                    );
                    attempts.push((device, err.to_string()));
                }
            }
        }

        Err(EngineError::NoDeviceAvailable { attempts })
    }

    /// Run one step of a request plan on `device`.
    fn attempt(&self, device: DeviceKind, prompt: &str) -> Result<AttemptOutcome, CorrectionError> {
        if device == self.primary_device {
            let mut generator = self
                .primary
                .lock()
                .map_err(|_| CorrectionError::Poisoned { device })?;
            return Ok(generator.generate(prompt, self.max_new_tokens).into());
        }

        let mut slot = self
            .cpu_fallback
            .lock()
            .map_err(|_| CorrectionError::Poisoned { device })?;
        if slot.is_none() {
            tracing::info!(device = %device, "Loading fallback generator");
            let generator = self
                .loader
                .load(device)
                .map_err(|e| CorrectionError::FallbackUnavailable(e.to_string()))?;
            *slot = Some(generator);
        }
        let Some(generator) = slot.as_mut() else {
            return Err(CorrectionError::FallbackUnavailable(
                "fallback generator missing after load".to_string(),
            ));
        };
        Ok(generator.generate(prompt, self.max_new_tokens).into())
    }
}

impl Corrector for CorrectionEngine {
    fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let prompt = format_prompt(text);
        let input_chars = text.chars().count();
        let mut exhausted: Option<CorrectionError> = None;

        for (step, device) in request_plan(self.primary_device).into_iter().enumerate() {
            match self.attempt(device, &prompt)? {
                AttemptOutcome::Completed(continuation) => {
                    let corrected = extract_correction(&continuation);
                    if corrected.is_empty() {
                        return Err(CorrectionError::EmptyOutput { device });
                    }
                    if step > 0 {
                        tracing::info!(device = %device, input_chars, "Correction served by fallback device");
                    }
                    return Ok(corrected);
                }
                AttemptOutcome::ResourceExhausted(message) => {
                    tracing::warn!(
                        device = %device,
                        input_chars,
                        step,
                        error = %message,
                        "Generation exhausted device memory"
                    );
                    exhausted = Some(CorrectionError::ResourceExhausted { device, message });
                }
                AttemptOutcome::Failed(message) => {
                    return Err(CorrectionError::Generation { device, message });
                }
            }
        }

        Err(exhausted.unwrap_or(CorrectionError::Generation {
            device: self.primary_device,
            message: "request plan was empty".to_string(),
        }))
    }

    fn device(&self) -> DeviceKind {
        self.primary_device
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
