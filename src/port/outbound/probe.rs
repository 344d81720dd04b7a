//! Readiness probe port.

use async_trait::async_trait;

use crate::domain::Address;

/// Checks whether a freshly launched process accepts connections.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// One probe attempt. Returns `true` if `address` is accepting connections.
    async fn probe(&self, address: &Address) -> bool;
}
