//! Hatchery - local cluster bootstrap for a scheduler / object store / worker
//! runtime.
//!
//! Starts a scheduler, object stores, and workers as OS processes in a fixed
//! order, attaches a driver, and tears everything down again with an
//! escalating kill / terminate protocol.
//!
//! # Architecture
//!
//! - [`domain`] - Addresses, roles, port counters, driver handles, and the
//!   termination state machine
//! - [`port`] - Traits for process launching, driver connections, and
//!   readiness probes
//! - [`adapter`] - OS process launcher, TCP probe, logging connector, CLI
//! - [`application`] - The [`Orchestrator`](application::Orchestrator) and
//!   its registries
//! - [`infrastructure`] - Configuration and runtime wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use hatchery::application::ClusterRequest;
//! use hatchery::infrastructure::bootstrap::build_orchestrator;
//! use hatchery::infrastructure::config::Config;
//!
//! # async fn demo() -> hatchery::error::Result<()> {
//! let config = Config::load("cluster.toml")?;
//! let mut orchestrator = build_orchestrator(&config)?;
//! let cluster = orchestrator.start_cluster(&ClusterRequest::default()).await?;
//! println!("scheduler at {}", cluster.topology.scheduler_address);
//! let report = orchestrator.cleanup().await;
//! assert!(report.unresponsive() == 0);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
