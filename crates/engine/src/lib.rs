//! Grammar-correction engine.
//!
//! Wraps a pretrained Gemma-3 sequence-generation model behind a single
//! `correct(text) -> text` operation. The engine picks the best available
//! device at start-up (CUDA, then Metal, then CPU) and, when a request runs
//! out of accelerator memory, retries that request once on the CPU.
//!
//! The model itself is an opaque capability: [`backend`] defines the seam,
//! [`gemma`] is the candle implementation, and [`prompt`] fixes the
//! instruction format and output-extraction contract.

pub mod backend;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod gemma;
pub mod prompt;
pub mod slot;

pub use engine::{CorrectionEngine, Corrector};
pub use slot::EngineSlot;
