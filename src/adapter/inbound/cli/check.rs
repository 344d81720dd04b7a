//! Handler for `hatchery check config`.

use std::path::Path;

use super::dispatch::load_config;
use super::output;
use crate::error::Result;
use crate::infrastructure::config::readiness::ReadinessMode;

/// Validate a configuration file without launching anything.
pub fn execute_config(path: &Path) -> Result<()> {
    let config = load_config(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    let request = config.cluster_request();
    output::section("Summary");
    match &request.scheduler_address {
        Some(address) => output::field("Scheduler", format!("join {address}")),
        None => output::field("Scheduler", "launch"),
    }
    output::field("Object stores", request.num_objstores);
    output::field(
        "Workers",
        request.num_objstores.saturating_mul(request.workers_per_objstore),
    );
    let drivers = if request.return_drivers {
        "explicit"
    } else {
        "implicit"
    };
    output::field("Drivers", drivers);
    let readiness = match config.readiness.mode {
        ReadinessMode::Settle => "settle",
        ReadinessMode::Probe => "probe",
    };
    output::field("Readiness", readiness);

    let settings = config.orchestrator_settings();
    if output::verbosity() > 0 {
        output::field("Scheduler bin", settings.scheduler_binary.display());
        output::field("Objstore bin", settings.objstore_binary.display());
    }
    if request.scheduler_address.is_none() && !settings.scheduler_binary.exists() {
        output::warning(&format!(
            "scheduler binary {} not found",
            settings.scheduler_binary.display()
        ));
    }
    if request.num_objstores > 0 && !settings.objstore_binary.exists() {
        output::warning(&format!(
            "objstore binary {} not found",
            settings.objstore_binary.display()
        ));
    }

    Ok(())
}
