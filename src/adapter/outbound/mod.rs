//! Outbound adapters (driven side).

pub mod driver;
pub mod probe;
pub mod process;
