//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Orchestrator       │
//!                    │  (application layer)    │
//!                    └────────────┬────────────┘
//!         ┌───────────────────────┼───────────────────────┐
//!         ▼                       ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐       ┌───────────────┐
//! │ProcessLauncher│       │DriverConnector│       │ReadinessProbe │
//! └───────────────┘       └───────────────┘       └───────────────┘
//! ```

pub mod outbound;

pub use outbound::driver::DriverConnector;
pub use outbound::probe::ReadinessProbe;
pub use outbound::process::{LaunchSpec, ProcessHandle, ProcessLauncher, ProcessStatus};
