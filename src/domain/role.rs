//! Process roles in a cluster.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of process the orchestrator launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Assigns tasks across the cluster.
    Scheduler,
    /// Shared data storage for one group of workers.
    ObjectStore,
    /// Executes tasks; also used for driver connection addresses.
    Worker,
}

impl Role {
    /// Base of the conventional port range for this role.
    ///
    /// Allocated ports start one above the base.
    #[must_use]
    pub const fn base_port(self) -> u16 {
        match self {
            Role::Scheduler => 10_000,
            Role::ObjectStore => 20_000,
            Role::Worker => 40_000,
        }
    }

    /// Stable snake_case label for logs and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Scheduler => "scheduler",
            Role::ObjectStore => "object_store",
            Role::Worker => "worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
