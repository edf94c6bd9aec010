//! Domain primitives shared by every Nahw crate.
//!
//! Nothing in here performs I/O: the types, error taxonomy and submission
//! rules defined here are consumed by the persistence, engine and API layers.

pub mod correction;
pub mod error;
pub mod types;
