//! Stage gating between bootstrap steps.
//!
//! The default strategy waits a fixed settle interval after each stage. The
//! probing strategy instead polls every freshly launched address with a
//! [`ReadinessProbe`] under an exponential backoff, and fails the stage with
//! [`ReadinessError::NotReadyYet`] once the attempt budget is spent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::{Address, Role};
use crate::error::ReadinessError;
use crate::port::outbound::probe::ReadinessProbe;

/// Bootstrap stages that are followed by a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scheduler,
    ObjectStore,
    Workers,
    Drivers,
}

impl Stage {
    /// Role of the processes launched in this stage, if any.
    #[must_use]
    pub const fn role(self) -> Option<Role> {
        match self {
            Stage::Scheduler => Some(Role::Scheduler),
            Stage::ObjectStore => Some(Role::ObjectStore),
            Stage::Workers => Some(Role::Worker),
            Stage::Drivers => None,
        }
    }
}

/// Fixed settle intervals per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimings {
    pub scheduler: Duration,
    pub object_store: Duration,
    pub workers: Duration,
    pub drivers: Duration,
}

impl SettleTimings {
    /// No waiting at all. Useful with fake launchers.
    pub const ZERO: Self = Self {
        scheduler: Duration::ZERO,
        object_store: Duration::ZERO,
        workers: Duration::ZERO,
        drivers: Duration::ZERO,
    };

    #[must_use]
    pub const fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Scheduler => self.scheduler,
            Stage::ObjectStore => self.object_store,
            Stage::Workers => self.workers,
            Stage::Drivers => self.drivers,
        }
    }
}

impl Default for SettleTimings {
    fn default() -> Self {
        Self {
            scheduler: Duration::from_millis(100),
            object_store: Duration::from_millis(200),
            workers: Duration::from_millis(300),
            drivers: Duration::from_millis(500),
        }
    }
}

/// Exponential backoff between probe attempts.
///
/// The delay for attempt `n` is `first × factor^n`, clamped to `max`. Jitter,
/// when enabled, adds up to 20% on top of the clamped value and never feeds
/// back into later attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub first: Duration,
    pub max: Duration,
    pub factor: f64,
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            first: Duration::from_millis(50),
            max: Duration::from_secs(1),
            factor: 2.0,
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retrying after attempt `attempt` (0-indexed) failed.
    #[must_use]
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        if !self.jitter {
            return base;
        }
        let range_ms = u64::try_from(base.as_millis() / 5).unwrap_or(u64::MAX);
        if range_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=range_ms))
    }
}

/// How the probing strategy retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbePolicy {
    /// Attempts per address before giving up. At least one.
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Decides when the next bootstrap stage may start.
#[derive(Clone)]
pub struct ReadinessGate {
    timings: SettleTimings,
    probe: Option<(Arc<dyn ReadinessProbe>, ProbePolicy)>,
}

impl fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("timings", &self.timings)
            .field("policy", &self.probe.as_ref().map(|(_, policy)| policy))
            .finish()
    }
}

impl ReadinessGate {
    /// Fixed settle intervals only.
    #[must_use]
    pub fn settle(timings: SettleTimings) -> Self {
        Self {
            timings,
            probe: None,
        }
    }

    /// Probe launched processes; the driver stage still uses its settle
    /// interval since drivers are not separate processes.
    #[must_use]
    pub fn probing(
        timings: SettleTimings,
        probe: Arc<dyn ReadinessProbe>,
        policy: ProbePolicy,
    ) -> Self {
        Self {
            timings,
            probe: Some((probe, policy)),
        }
    }

    #[must_use]
    pub fn is_probing(&self) -> bool {
        self.probe.is_some()
    }

    /// Wait until the processes launched in `stage` at `addresses` are
    /// considered ready.
    ///
    /// # Errors
    ///
    /// Returns [`ReadinessError::NotReadyYet`] if probing is enabled and an
    /// address never accepted a connection.
    pub async fn wait(&self, stage: Stage, addresses: &[Address]) -> Result<(), ReadinessError> {
        match (&self.probe, stage.role()) {
            (Some((probe, policy)), Some(role)) => {
                for address in addresses {
                    Self::probe_until_ready(probe.as_ref(), *policy, role, address).await?;
                }
                Ok(())
            }
            _ => {
                let delay = self.timings.for_stage(stage);
                if !delay.is_zero() {
                    debug!(stage = ?stage, delay_ms = delay.as_millis(), "Settling");
                    sleep(delay).await;
                }
                Ok(())
            }
        }
    }

    async fn probe_until_ready(
        probe: &dyn ReadinessProbe,
        policy: ProbePolicy,
        role: Role,
        address: &Address,
    ) -> Result<(), ReadinessError> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 0..attempts {
            if probe.probe(address).await {
                debug!(role = %role, address = %address, attempt = attempt + 1, "Process ready");
                return Ok(());
            }
            if attempt + 1 < attempts {
                sleep(policy.backoff.next(attempt)).await;
            }
        }

        warn!(role = %role, address = %address, attempts, "Process never became ready");
        Err(ReadinessError::NotReadyYet {
            role,
            address: address.clone(),
            attempts,
        })
    }
}
