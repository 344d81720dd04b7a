//! Driver connection types.
//!
//! A driver is a client attached to a running cluster. It is not a process
//! the orchestrator launches; it is created through the external connect API
//! and only tracked here.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;

/// Unique identifier for a driver connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(Uuid);

impl DriverId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three addresses a driver is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverEndpoints {
    pub scheduler: Address,
    pub objstore: Address,
    pub worker: Address,
}

/// Whether a connect call attaches the process-wide implicit driver or
/// creates a separately owned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    /// The single global driver; disconnected with no handle.
    Implicit,
    /// A driver the caller keeps a handle to.
    Explicit,
}

/// Handle to a connected driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverHandle {
    id: DriverId,
    endpoints: DriverEndpoints,
}

impl DriverHandle {
    /// Create a handle for a driver bound to `endpoints`.
    #[must_use]
    pub fn new(id: DriverId, endpoints: DriverEndpoints) -> Self {
        Self { id, endpoints }
    }

    #[must_use]
    pub const fn id(&self) -> DriverId {
        self.id
    }

    #[must_use]
    pub const fn endpoints(&self) -> &DriverEndpoints {
        &self.endpoints
    }
}
