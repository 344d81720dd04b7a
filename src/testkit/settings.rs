//! Orchestrators wired for tests: fake collaborators and, by default, no
//! waiting.

use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    Orchestrator, OrchestratorSettings, ReadinessGate, SettleTimings, ShutdownPolicy,
};
use crate::port::outbound::driver::DriverConnector;
use crate::port::outbound::process::ProcessLauncher;

/// Short grace periods so unresponsive processes do not slow tests down.
#[must_use]
pub fn fast_shutdown() -> ShutdownPolicy {
    ShutdownPolicy {
        kill_grace: Duration::from_millis(20),
        terminate_grace: Duration::from_millis(20),
        poll_interval: Duration::from_millis(1),
    }
}

#[must_use]
pub fn instant_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        shutdown: fast_shutdown(),
        ..OrchestratorSettings::default()
    }
}

/// Orchestrator with zero settle intervals.
#[must_use]
pub fn orchestrator<L, C>(launcher: &L, connector: &C) -> Orchestrator
where
    L: ProcessLauncher + Clone + 'static,
    C: DriverConnector + Clone + 'static,
{
    orchestrator_with(launcher, connector, instant_settings())
}

/// Like [`orchestrator`] with explicit settings.
#[must_use]
pub fn orchestrator_with<L, C>(
    launcher: &L,
    connector: &C,
    settings: OrchestratorSettings,
) -> Orchestrator
where
    L: ProcessLauncher + Clone + 'static,
    C: DriverConnector + Clone + 'static,
{
    settled_orchestrator(launcher, connector, settings, SettleTimings::ZERO)
}

/// Orchestrator that sleeps `timings` between stages.
#[must_use]
pub fn settled_orchestrator<L, C>(
    launcher: &L,
    connector: &C,
    settings: OrchestratorSettings,
    timings: SettleTimings,
) -> Orchestrator
where
    L: ProcessLauncher + Clone + 'static,
    C: DriverConnector + Clone + 'static,
{
    Orchestrator::builder()
        .settings(settings)
        .launcher(Arc::new(launcher.clone()))
        .connector(Arc::new(connector.clone()))
        .readiness(ReadinessGate::settle(timings))
        .build()
        .expect("launcher and connector are set")
}
