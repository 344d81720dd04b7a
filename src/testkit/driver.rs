//! Recording driver connector.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{DriverEndpoints, DriverHandle, DriverId, DriverMode};
use crate::error::{Error, Result};
use crate::port::outbound::driver::DriverConnector;

#[derive(Debug, Default)]
struct ConnectorState {
    connects: Vec<(DriverEndpoints, DriverMode)>,
    disconnects: Vec<Option<DriverId>>,
    fail_connect_after: Option<usize>,
    fail_disconnect: bool,
}

/// Connector that records every call and can be scripted to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    state: Arc<Mutex<ConnectorState>>,
}

impl RecordingConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` connects succeed, later ones fail.
    #[must_use]
    pub fn failing_connect_after(self, n: usize) -> Self {
        self.state.lock().fail_connect_after = Some(n);
        self
    }

    /// Every disconnect fails.
    #[must_use]
    pub fn failing_disconnect(self) -> Self {
        self.state.lock().fail_disconnect = true;
        self
    }

    #[must_use]
    pub fn connects(&self) -> Vec<(DriverEndpoints, DriverMode)> {
        self.state.lock().connects.clone()
    }

    /// Disconnect calls in order; `None` is the implicit driver.
    #[must_use]
    pub fn disconnects(&self) -> Vec<Option<DriverId>> {
        self.state.lock().disconnects.clone()
    }
}

#[async_trait]
impl DriverConnector for RecordingConnector {
    async fn connect(&self, endpoints: &DriverEndpoints, mode: DriverMode) -> Result<DriverHandle> {
        let mut state = self.state.lock();
        if state
            .fail_connect_after
            .is_some_and(|n| state.connects.len() >= n)
        {
            return Err(Error::Connection(format!(
                "scheduler at {} refused the driver",
                endpoints.scheduler
            )));
        }
        state.connects.push((endpoints.clone(), mode));
        Ok(DriverHandle::new(DriverId::generate(), endpoints.clone()))
    }

    async fn disconnect(&self, driver: Option<&DriverHandle>) -> Result<()> {
        let mut state = self.state.lock();
        state.disconnects.push(driver.map(DriverHandle::id));
        if state.fail_disconnect {
            return Err(Error::Connection("driver already gone".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
