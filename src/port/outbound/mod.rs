//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators the orchestrator drives:
//! operating-system processes, the driver client library, and readiness
//! probes.

pub mod driver;
pub mod probe;
pub mod process;
