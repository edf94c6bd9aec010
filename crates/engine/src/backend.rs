//! The seam between the engine and a concrete model runtime.
//!
//! A [`GeneratorLoader`] binds the model to one device and hands back a
//! [`Generator`]. The engine owns the generators and decides which device
//! serves each attempt; the backend only knows how to run one generation.

use crate::device::DeviceKind;
use crate::error::{EngineError, GenerationError};

/// A model bound to a single device.
///
/// Generation takes `&mut self` because decoding mutates the KV cache; the
/// engine serialises access per device.
pub trait Generator: Send {
    /// Device this generator runs on.
    fn device(&self) -> DeviceKind;

    /// Run greedy generation for `prompt` with at most `max_new_tokens`
    /// new tokens.
    ///
    /// Returns the decoded continuation only: the tokens generated after
    /// the prompt, special tokens skipped.
    fn generate(&mut self, prompt: &str, max_new_tokens: usize) -> Result<String, GenerationError>;
}

/// Binds the model to a device.
pub trait GeneratorLoader: Send + Sync {
    /// Load the model on `device`, or report why it cannot be used.
    fn load(&self, device: DeviceKind) -> Result<Box<dyn Generator>, EngineError>;
}
