//! Handler for `hatchery up`.

use tabled::{Table, Tabled};
use tracing::info;

use super::command::UpArgs;
use super::dispatch::load_config;
use super::output;
use super::signal::wait_for_shutdown_signal;
use crate::application::{ClusterHandle, ProcessSummary, ShutdownReport};
use crate::domain::Address;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::logging::{LogFormat, LogTarget};
use crate::infrastructure::config::Config;

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Started")]
    started: String,
}

impl From<&ProcessSummary> for ProcessRow {
    fn from(summary: &ProcessSummary) -> Self {
        Self {
            role: summary.role.to_string(),
            address: summary.address.to_string(),
            pid: pid_label(summary.pid),
            started: summary.launched_at.format("%H:%M:%S%.3f").to_string(),
        }
    }
}

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

fn pid_label(pid: Option<u32>) -> String {
    pid.map_or_else(|| "-".to_string(), |pid| pid.to_string())
}

/// Start the cluster, wait for a shutdown signal, then clean up.
pub async fn execute(args: &UpArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::from_env(),
    };
    apply_overrides(&mut config, args, output::is_json())?;
    config.validate()?;
    config.init_logging();

    let mut orchestrator = bootstrap::build_orchestrator(&config)?;
    let request = config.cluster_request();

    output::header(env!("CARGO_PKG_VERSION"));
    let handle = match orchestrator.start_cluster(&request).await {
        Ok(handle) => handle,
        Err(e) => {
            output::error(&format!("bootstrap failed: {e}"));
            let report = orchestrator.cleanup().await;
            print_report(&report);
            return Err(e);
        }
    };

    print_topology(&handle, &orchestrator.processes().summaries());
    output::hint("press Ctrl-C to stop the cluster");

    let waited = wait_for_shutdown_signal().await;
    info!("Shutdown signal received");

    output::section("Stopping");
    let report = orchestrator.cleanup().await;
    print_report(&report);

    waited?;
    Ok(())
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &UpArgs, machine_output: bool) -> Result<()> {
    if let Some(objstores) = args.objstores {
        config.cluster.num_objstores = objstores;
    }
    if let Some(workers) = args.workers {
        config.cluster.workers_per_objstore = workers;
    }
    if let Some(program) = &args.worker_program {
        config.cluster.worker_program = Some(program.clone());
    }
    if let Some(address) = &args.scheduler_address {
        config.cluster.scheduler_address = Some(address.parse::<Address>()?);
    }
    if args.return_drivers {
        config.cluster.return_drivers = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs || machine_output {
        config.logging.format = LogFormat::Json;
    }
    // stdout carries the JSON records in machine mode.
    if machine_output {
        config.logging.target = LogTarget::Stderr;
    }
    Ok(())
}

fn print_topology(handle: &ClusterHandle, processes: &[ProcessSummary]) {
    let topology = &handle.topology;

    output::section("Cluster");
    output::field("Scheduler", &topology.scheduler_address);
    output::field("Object stores", topology.objstore_addresses.len());
    output::field("Workers", topology.worker_count());
    match &handle.drivers {
        Some(drivers) => output::field("Drivers", drivers.len()),
        None => output::field("Drivers", "implicit"),
    }
    output::record("cluster", handle);

    if processes.is_empty() {
        return;
    }
    output::section("Processes");
    let rows: Vec<ProcessRow> = processes.iter().map(ProcessRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    output::record("processes", &processes);
}

fn print_report(report: &ShutdownReport) {
    if !report.processes.is_empty() {
        let rows: Vec<OutcomeRow> = report
            .processes
            .iter()
            .map(|p| OutcomeRow {
                role: p.role.to_string(),
                address: p.address.to_string(),
                pid: pid_label(p.pid),
                outcome: p.outcome.to_string(),
            })
            .collect();
        output::lines(&Table::new(rows).to_string());
    }
    output::record("shutdown", report);

    for warning in &report.warnings {
        output::warning(&warning.to_string());
    }
    if report.unresponsive() == 0 {
        output::success(&format!("Stopped {} processes", report.stopped()));
    }
}
