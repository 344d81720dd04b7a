//! Application layer: the orchestrator and the state it owns.
//!
//! - [`orchestrator`] - Bootstrap sequencing and the [`Orchestrator`] context
//! - [`registry`] - Launched process records
//! - [`drivers`] - Explicit driver handles
//! - [`readiness`] - Settle intervals and readiness probing between stages
//! - [`shutdown`] - Escalating termination and driver disconnects

pub mod drivers;
pub mod orchestrator;
pub mod readiness;
pub mod registry;
pub mod shutdown;

pub use drivers::DriverRegistry;
pub use orchestrator::{
    ClusterHandle, ClusterRequest, NodeHandle, NodeRequest, Orchestrator, OrchestratorBuilder,
    OrchestratorSettings,
};
pub use readiness::{BackoffPolicy, ProbePolicy, ReadinessGate, SettleTimings, Stage};
pub use registry::{ProcessRecord, ProcessRegistry, ProcessSummary};
pub use shutdown::{ProcessOutcome, ShutdownCoordinator, ShutdownPolicy, ShutdownReport};
