//! Teardown of launched processes and attached drivers.
//!
//! Each process goes through the [`TerminationState`] protocol: skip if
//! already exited, otherwise kill, then terminate, then give up. Every wait
//! is bounded by a grace period, so teardown always finishes. Problems are
//! logged and collected as [`ShutdownWarning`]s; nothing here returns an
//! error.

use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::drivers::DriverRegistry;
use super::registry::{ProcessRecord, ProcessRegistry};
use crate::domain::{Address, Role, TerminationOutcome, TerminationState};
use crate::error::ShutdownWarning;
use crate::port::outbound::driver::DriverConnector;
use crate::port::outbound::process::ProcessHandle;

/// Grace periods for the termination protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownPolicy {
    /// How long to wait for a process to exit after the kill signal.
    pub kill_grace: Duration,
    /// How long to wait for a process to exit after the terminate signal.
    pub terminate_grace: Duration,
    /// How often exit status is polled within a grace period.
    pub poll_interval: Duration,
}

impl Default for ShutdownPolicy {
    fn default() -> Self {
        Self {
            kill_grace: Duration::from_millis(50),
            terminate_grace: Duration::from_millis(50),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// What happened to one process during teardown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub role: Role,
    pub address: Address,
    pub pid: Option<u32>,
    pub outcome: TerminationOutcome,
}

/// Summary of a teardown.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownReport {
    /// Per-process outcomes in registry order.
    pub processes: Vec<ProcessOutcome>,
    /// Explicit driver handles disconnected (including failed attempts).
    pub drivers_disconnected: usize,
    /// Whether the implicit driver was disconnected instead.
    pub implicit_disconnect: bool,
    #[serde(skip)]
    pub warnings: Vec<ShutdownWarning>,
}

impl ShutdownReport {
    /// Count of processes confirmed stopped.
    #[must_use]
    pub fn stopped(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.outcome.is_stopped())
            .count()
    }

    /// Count of processes that could not be confirmed stopped.
    #[must_use]
    pub fn unresponsive(&self) -> usize {
        self.processes.len() - self.stopped()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Runs the termination protocol over registries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShutdownCoordinator {
    policy: ShutdownPolicy,
}

impl ShutdownCoordinator {
    #[must_use]
    pub const fn new(policy: ShutdownPolicy) -> Self {
        Self { policy }
    }

    /// Stop every process and disconnect every driver. Both registries are
    /// empty afterwards.
    pub async fn shutdown(
        &self,
        processes: &mut ProcessRegistry,
        drivers: &mut DriverRegistry,
        connector: &dyn DriverConnector,
    ) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        self.stop_processes(processes, &mut report).await;
        self.disconnect_drivers(drivers, connector, &mut report).await;

        info!(
            stopped = report.stopped(),
            unresponsive = report.unresponsive(),
            drivers = report.drivers_disconnected,
            warnings = report.warnings.len(),
            "Cleanup finished"
        );
        report
    }

    /// Stop every registered process in order, then clear the registry.
    pub async fn stop_processes(&self, processes: &mut ProcessRegistry, report: &mut ShutdownReport) {
        // Records are dropped at the end of this call whatever their outcome.
        for mut record in processes.take_all() {
            let outcome = self.stop(&mut record, &mut report.warnings).await;
            report.processes.push(ProcessOutcome {
                role: record.role(),
                address: record.address().clone(),
                pid: record.pid(),
                outcome,
            });
        }
    }

    /// Run the termination protocol for one process.
    pub async fn stop(
        &self,
        record: &mut ProcessRecord,
        warnings: &mut Vec<ShutdownWarning>,
    ) -> TerminationOutcome {
        let role = record.role();
        let address = record.address().clone();
        let pid = record.pid();
        let mut state = TerminationState::Running;

        loop {
            let exited = match state {
                TerminationState::Running => has_exited(record.handle_mut()),
                TerminationState::KillSent => {
                    debug!(role = %role, address = %address, "Attempting to kill process");
                    if let Err(e) = record.handle_mut().kill() {
                        warnings.push(signal_failed(role, &address, &e));
                    }
                    self.wait_for_exit(record.handle_mut(), self.policy.kill_grace)
                        .await
                }
                TerminationState::TerminateSent => {
                    debug!(role = %role, address = %address, "Kill did not take, terminating");
                    if let Err(e) = record.handle_mut().terminate() {
                        warnings.push(signal_failed(role, &address, &e));
                    }
                    self.wait_for_exit(record.handle_mut(), self.policy.terminate_grace)
                        .await
                }
                TerminationState::Done(outcome) => {
                    match outcome {
                        TerminationOutcome::AlreadyExited => {
                            info!(role = %role, address = %address, "Process had already exited");
                        }
                        TerminationOutcome::Killed => {
                            info!(role = %role, address = %address, "Process killed");
                        }
                        TerminationOutcome::Terminated => {
                            info!(role = %role, address = %address, "Process terminated");
                        }
                        TerminationOutcome::Unresponsive => {
                            let warning = ShutdownWarning::Unresponsive { role, address, pid };
                            warn!(%warning, "Giving up on process");
                            warnings.push(warning);
                        }
                    }
                    return outcome;
                }
            };
            state = state.observe(exited);
        }
    }

    /// Wait up to `grace` for the process to exit.
    async fn wait_for_exit(&self, handle: &mut dyn ProcessHandle, grace: Duration) -> bool {
        let poll = self.policy.poll_interval.max(Duration::from_millis(1));
        let exited = timeout(grace, async {
            loop {
                if has_exited(handle) {
                    return;
                }
                sleep(poll).await;
            }
        })
        .await
        .is_ok();

        // The deadline may fire between the last poll and the exit.
        exited || has_exited(handle)
    }

    /// Disconnect every registered driver, or the implicit driver when none
    /// are registered, then clear the registry.
    pub async fn disconnect_drivers(
        &self,
        drivers: &mut DriverRegistry,
        connector: &dyn DriverConnector,
        report: &mut ShutdownReport,
    ) {
        let handles = drivers.take_all();

        if handles.is_empty() {
            report.implicit_disconnect = true;
            if let Err(e) = connector.disconnect(None).await {
                let warning = ShutdownWarning::DisconnectFailed {
                    driver: None,
                    reason: e.to_string(),
                };
                warn!(%warning, "Implicit driver disconnect failed");
                report.warnings.push(warning);
            }
            return;
        }

        for handle in &handles {
            report.drivers_disconnected += 1;
            if let Err(e) = connector.disconnect(Some(handle)).await {
                let warning = ShutdownWarning::DisconnectFailed {
                    driver: Some(handle.id()),
                    reason: e.to_string(),
                };
                warn!(%warning, "Driver disconnect failed");
                report.warnings.push(warning);
            }
        }
    }
}

fn has_exited(handle: &mut dyn ProcessHandle) -> bool {
    match handle.status() {
        Ok(status) => status.has_exited(),
        Err(e) => {
            warn!(pid = ?handle.id(), error = %e, "Could not read process status");
            false
        }
    }
}

fn signal_failed(role: Role, address: &Address, error: &std::io::Error) -> ShutdownWarning {
    let warning = ShutdownWarning::SignalFailed {
        role,
        address: address.clone(),
        reason: error.to_string(),
    };
    warn!(%warning, "Signal not delivered");
    warning
}
