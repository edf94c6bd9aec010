//! Nahw API server library.
//!
//! Exposes configuration, state, the correction orchestrator, error
//! handling, views and routes so the binary entrypoint and integration
//! tests build the exact same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod router;
pub mod routes;
pub mod state;
pub mod views;
