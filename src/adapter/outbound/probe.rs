//! TCP readiness probe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::domain::Address;
use crate::port::outbound::probe::ReadinessProbe;

/// Considers a process ready once its bind address accepts a TCP connection.
#[derive(Debug, Clone, Copy)]
pub struct TcpProbe {
    connect_timeout: Duration,
}

impl TcpProbe {
    #[must_use]
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl ReadinessProbe for TcpProbe {
    async fn probe(&self, address: &Address) -> bool {
        let target = address.to_string();
        match timeout(self.connect_timeout, TcpStream::connect(target.as_str())).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                trace!(address = %address, error = %e, "Probe refused");
                false
            }
            Err(_) => {
                trace!(address = %address, "Probe timed out");
                false
            }
        }
    }
}
