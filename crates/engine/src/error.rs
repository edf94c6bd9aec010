//! Engine error types: load-time, per-attempt, and per-request.

use crate::device::DeviceKind;

/// Failures while loading a generator at start-up (or the lazy CPU
/// fallback generator).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The device is not present or this build lacks its backend.
    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: DeviceKind, reason: String },

    /// Model directory is missing a required file or has an unreadable one.
    #[error("Model files invalid: {0}")]
    ModelFiles(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// Every device in the priority order failed.
    #[error("No device could load the model ({})", format_attempts(.attempts))]
    NoDeviceAvailable { attempts: Vec<(DeviceKind, String)> },
}

fn format_attempts(attempts: &[(DeviceKind, String)]) -> String {
    attempts
        .iter()
        .map(|(device, reason)| format!("{device}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of a single failed generation attempt on one device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The device ran out of memory; eligible for CPU fallback.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Any other generation failure; not retried.
    #[error("Generation failed: {0}")]
    Failed(String),
}

/// Error substrings that identify memory exhaustion across backends.
const EXHAUSTION_MARKERS: [&str; 3] = ["out of memory", "out_of_memory", "failed to allocate"];

impl GenerationError {
    /// Classify a backend error by its message.
    pub fn classify(message: String) -> Self {
        let lowered = message.to_lowercase();
        if EXHAUSTION_MARKERS.iter().any(|m| lowered.contains(m)) {
            GenerationError::ResourceExhausted(message)
        } else {
            GenerationError::Failed(message)
        }
    }
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::classify(err.to_string())
    }
}

/// The engine could not produce a correction for a request.
#[derive(Debug, thiserror::Error)]
pub enum CorrectionError {
    /// Memory ran out on the last device in the request plan.
    #[error("Resource exhausted on {device}: {message}")]
    ResourceExhausted { device: DeviceKind, message: String },

    /// Generation failed for a reason other than memory exhaustion.
    #[error("Generation failed on {device}: {message}")]
    Generation { device: DeviceKind, message: String },

    /// The CPU fallback generator could not be loaded.
    #[error("CPU fallback unavailable: {0}")]
    FallbackUnavailable(String),

    /// The model produced no text after extraction.
    #[error("Model returned an empty correction on {device}")]
    EmptyOutput { device: DeviceKind },

    /// A previous generation panicked while holding the generator lock.
    #[error("Generator on {device} is poisoned")]
    Poisoned { device: DeviceKind },
}

impl CorrectionError {
    /// Short machine-readable failure kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CorrectionError::ResourceExhausted { .. } => "resource_exhausted",
            CorrectionError::Generation { .. } => "generation_failed",
            CorrectionError::FallbackUnavailable(_) => "fallback_unavailable",
            CorrectionError::EmptyOutput { .. } => "empty_output",
            CorrectionError::Poisoned { .. } => "poisoned",
        }
    }
}
