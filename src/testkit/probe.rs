//! Scripted readiness probe.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::Address;
use crate::port::outbound::probe::ReadinessProbe;

#[derive(Debug, Default)]
struct ProbeState {
    /// Failed attempts before an address reports ready; `None` means never.
    failures: HashMap<Address, Option<u32>>,
    attempts: HashMap<Address, u32>,
}

/// Probe whose answers are scripted per address. Unscripted addresses are
/// ready on the first attempt.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl ScriptedProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `address` fails `failures` probes before succeeding.
    #[must_use]
    pub fn ready_after(self, address: Address, failures: u32) -> Self {
        self.state.lock().failures.insert(address, Some(failures));
        self
    }

    #[must_use]
    pub fn never_ready(self, address: Address) -> Self {
        self.state.lock().failures.insert(address, None);
        self
    }

    /// Probe attempts made against `address`.
    #[must_use]
    pub fn attempts(&self, address: &Address) -> u32 {
        self.state.lock().attempts.get(address).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ReadinessProbe for ScriptedProbe {
    async fn probe(&self, address: &Address) -> bool {
        let mut state = self.state.lock();
        let attempt = {
            let count = state.attempts.entry(address.clone()).or_insert(0);
            *count += 1;
            *count
        };
        match state.failures.get(address) {
            None => true,
            Some(None) => false,
            Some(Some(failures)) => attempt > *failures,
        }
    }
}
