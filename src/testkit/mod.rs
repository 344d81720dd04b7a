//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`process`] - `FakeLauncher` with per-role signal behavior
//! - [`driver`] - `RecordingConnector` that records connects and disconnects
//! - [`probe`] - `ScriptedProbe` for readiness tests
//! - [`settings`] - Orchestrators with zero or chosen settle intervals

pub mod driver;
pub mod probe;
pub mod process;
pub mod settings;
