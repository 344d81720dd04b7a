//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Command-line interface driving the orchestrator
//! - [`outbound`] - OS processes, TCP readiness probes, driver connector

pub mod inbound;
pub mod outbound;
