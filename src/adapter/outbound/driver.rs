//! Logging driver connector.
//!
//! Stands in for the external driver client library when the orchestrator is
//! run from the command line: it records which drivers are attached and logs
//! every connect and disconnect, but opens no connections of its own.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::domain::{DriverEndpoints, DriverHandle, DriverId, DriverMode};
use crate::error::{Error, Result};
use crate::port::outbound::driver::DriverConnector;

/// Connector that tracks drivers and logs via tracing.
#[derive(Debug, Default)]
pub struct LogConnector {
    explicit: Mutex<HashSet<DriverId>>,
    implicit: Mutex<Option<DriverHandle>>,
}

impl LogConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached drivers, counting the implicit one.
    #[must_use]
    pub fn connected(&self) -> usize {
        self.explicit.lock().len() + usize::from(self.implicit.lock().is_some())
    }
}

#[async_trait]
impl DriverConnector for LogConnector {
    async fn connect(&self, endpoints: &DriverEndpoints, mode: DriverMode) -> Result<DriverHandle> {
        let handle = DriverHandle::new(DriverId::generate(), endpoints.clone());

        match mode {
            DriverMode::Implicit => {
                let previous = self.implicit.lock().replace(handle.clone());
                if let Some(previous) = previous {
                    debug!(driver = %previous.id(), "Replacing implicit driver");
                }
            }
            DriverMode::Explicit => {
                self.explicit.lock().insert(handle.id());
            }
        }

        info!(
            driver = %handle.id(),
            mode = ?mode,
            scheduler = %endpoints.scheduler,
            objstore = %endpoints.objstore,
            worker = %endpoints.worker,
            "Driver connected"
        );
        Ok(handle)
    }

    async fn disconnect(&self, driver: Option<&DriverHandle>) -> Result<()> {
        match driver {
            Some(handle) => {
                if !self.explicit.lock().remove(&handle.id()) {
                    return Err(Error::Connection(format!(
                        "driver {} is not connected",
                        handle.id()
                    )));
                }
                info!(driver = %handle.id(), "Driver disconnected");
            }
            None => match self.implicit.lock().take() {
                Some(handle) => info!(driver = %handle.id(), "Implicit driver disconnected"),
                None => debug!("No implicit driver to disconnect"),
            },
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
