//! Composition root: wires the OS adapters into an [`Orchestrator`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::driver::LogConnector;
use crate::adapter::outbound::probe::TcpProbe;
use crate::adapter::outbound::process::OsProcessLauncher;
use crate::application::{Orchestrator, ReadinessGate};
use crate::error::Result;
use crate::infrastructure::config::readiness::ReadinessMode;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::driver::DriverConnector;
use crate::port::outbound::probe::ReadinessProbe;

/// Build the readiness gate selected by `[readiness].mode`.
#[must_use]
pub fn build_readiness_gate(config: &Config) -> ReadinessGate {
    let timings = config.timing.settle_timings();
    match config.readiness.mode {
        ReadinessMode::Settle => ReadinessGate::settle(timings),
        ReadinessMode::Probe => {
            let probe: Arc<dyn ReadinessProbe> =
                Arc::new(TcpProbe::new(config.readiness.connect_timeout()));
            ReadinessGate::probing(timings, probe, config.readiness.probe_policy())
        }
    }
}

/// Build an orchestrator that launches real processes.
///
/// # Errors
///
/// Returns an error if the orchestrator cannot be assembled.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let connector: Arc<dyn DriverConnector> = Arc::new(LogConnector::new());
    let settings = config.orchestrator_settings();

    info!(
        host = %settings.host,
        scheduler = %settings.scheduler_binary.display(),
        objstore = %settings.objstore_binary.display(),
        readiness = ?config.readiness.mode,
        connector = connector.name(),
        "Building orchestrator"
    );

    Orchestrator::builder()
        .settings(settings)
        .launcher(Arc::new(OsProcessLauncher::new()))
        .connector(connector)
        .readiness(build_readiness_gate(config))
        .build()
}
