//! Cluster domain types: addresses, roles, port counters, drivers, and the
//! termination protocol.

mod address;
mod driver;
mod port;
mod role;
mod termination;
mod topology;

pub mod error;

pub use address::Address;
pub use driver::{DriverEndpoints, DriverHandle, DriverId, DriverMode};
pub use port::{PortAllocator, PortCounter};
pub use role::Role;
pub use termination::{TerminationOutcome, TerminationState};
pub use topology::ClusterTopology;
