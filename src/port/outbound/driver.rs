//! Driver connection port.
//!
//! Drivers are clients attached to a running cluster. The client library that
//! actually speaks to the scheduler and object store lives outside this crate;
//! the orchestrator only calls it.

use async_trait::async_trait;

use crate::domain::{DriverEndpoints, DriverHandle, DriverMode};
use crate::error::Result;

/// Connects and disconnects drivers.
#[async_trait]
pub trait DriverConnector: Send + Sync {
    /// Attach a driver to the cluster at `endpoints`.
    ///
    /// With [`DriverMode::Implicit`] the connector binds its single global
    /// driver; the returned handle is informational only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](crate::error::Error::Connection) if the
    /// cluster cannot be reached.
    async fn connect(&self, endpoints: &DriverEndpoints, mode: DriverMode) -> Result<DriverHandle>;

    /// Detach a driver. `None` detaches the implicit global driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the connector fails to tear the connection down.
    async fn disconnect(&self, driver: Option<&DriverHandle>) -> Result<()>;

    /// Connector name for logging.
    fn name(&self) -> &'static str;
}
