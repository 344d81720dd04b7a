//! Infrastructure layer.
//!
//! Technical concerns that support the orchestrator without containing
//! bootstrap logic.
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
