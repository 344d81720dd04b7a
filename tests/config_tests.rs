use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use hatchery::domain::Address;
use hatchery::error::{ConfigError, Error};
use hatchery::infrastructure::config::logging::LogFormat;
use hatchery::infrastructure::config::readiness::ReadinessMode;
use hatchery::infrastructure::config::settings::{Config, SERVICES_DIR_ENV};
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("create temp config");
    fs::write(file.path(), contents).expect("write temp config");
    file
}

#[test]
fn empty_config_uses_defaults() {
    let config = Config::parse_toml("").unwrap();

    assert_eq!(config.cluster.host, "127.0.0.1");
    assert_eq!(config.cluster.num_objstores, 1);
    assert_eq!(config.cluster.workers_per_objstore, 0);
    assert!(!config.cluster.return_drivers);
    assert!(!config.cluster.rollback_on_failure);
    assert_eq!(config.readiness.mode, ReadinessMode::Settle);
    assert_eq!(config.logging.format, LogFormat::Pretty);

    let timings = config.timing.settle_timings();
    assert_eq!(timings.scheduler, Duration::from_millis(100));
    assert_eq!(timings.object_store, Duration::from_millis(200));
    assert_eq!(timings.workers, Duration::from_millis(300));
    assert_eq!(timings.drivers, Duration::from_millis(500));

    let policy = config.shutdown.policy();
    assert_eq!(policy.kill_grace, Duration::from_millis(50));
    assert_eq!(policy.terminate_grace, Duration::from_millis(50));
}

#[test]
fn full_config_loads_from_file() {
    let toml = r#"
[cluster]
host = "10.1.2.3"
scheduler_address = "10.1.2.1:10001"
num_objstores = 2
workers_per_objstore = 4
worker_program = "worker.py"
worker_interpreter = "python"
return_drivers = true
rollback_on_failure = true

[binaries]
scheduler = "/usr/bin/scheduler"
objstore = "/usr/bin/objstore"

[timing]
scheduler_settle_ms = 10
objstore_settle_ms = 20
workers_settle_ms = 30
driver_settle_ms = 40

[shutdown]
kill_grace_ms = 5
terminate_grace_ms = 6
poll_interval_ms = 1

[readiness]
mode = "probe"
max_attempts = 4

[logging]
level = "debug"
format = "json"
"#;
    let file = write_temp_config(toml);
    let config = Config::load(file.path()).unwrap();

    let request = config.cluster_request();
    assert_eq!(
        request.scheduler_address,
        Some(Address::new("10.1.2.1", 10001))
    );
    assert_eq!(request.num_objstores, 2);
    assert_eq!(request.workers_per_objstore, 4);
    assert!(request.return_drivers);

    let settings = config.orchestrator_settings();
    assert_eq!(settings.host, "10.1.2.3");
    assert_eq!(settings.scheduler_binary, PathBuf::from("/usr/bin/scheduler"));
    assert_eq!(settings.worker_interpreter.as_deref(), Some("python"));
    assert!(settings.rollback_on_failure);
    assert_eq!(settings.shutdown.terminate_grace, Duration::from_millis(6));

    assert_eq!(config.readiness.probe_policy().max_attempts, 4);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn workers_without_program_are_rejected() {
    let toml = "[cluster]\nworkers_per_objstore = 2\n";
    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "worker_program",
            ..
        })) => {}
        other => panic!("expected worker_program error, got {other:?}"),
    }
}

#[test]
fn implicit_driver_without_objstore_is_rejected() {
    let toml = "[cluster]\nnum_objstores = 0\n";
    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "num_objstores",
            ..
        }))
    ));
}

#[test]
fn malformed_scheduler_address_fails_to_parse() {
    let toml = "[cluster]\nscheduler_address = \"localhost\"\n";
    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn probe_backoff_must_not_shrink() {
    let toml = "[readiness]\nmode = \"probe\"\nbackoff_multiplier = 0.5\n";
    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "backoff_multiplier",
            ..
        }))
    ));
}

#[test]
fn probe_settings_are_ignored_in_settle_mode() {
    let toml = "[readiness]\nbackoff_multiplier = 0.5\n";
    assert!(Config::parse_toml(toml).is_ok());
}

#[test]
fn zero_poll_interval_is_rejected() {
    let toml = "[shutdown]\npoll_interval_ms = 0\n";
    assert!(Config::parse_toml(toml).is_err());
}

#[test]
fn unknown_log_format_fails_to_parse() {
    let toml = "[logging]\nformat = \"xml\"\n";
    assert!(matches!(
        Config::parse_toml(toml),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn missing_file_is_read_error() {
    let result = Config::load("/nonexistent/hatchery/cluster.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn services_dir_env_overrides_file() {
    let toml = "[binaries]\nservices_dir = \"/from/file\"\n";

    std::env::set_var(SERVICES_DIR_ENV, "/from/env");
    let overridden = Config::parse_toml(toml);
    let from_env = Config::from_env();
    std::env::remove_var(SERVICES_DIR_ENV);

    let config = overridden.unwrap();
    assert_eq!(
        config.orchestrator_settings().objstore_binary,
        PathBuf::from("/from/env/objstore")
    );
    assert_eq!(
        from_env.orchestrator_settings().scheduler_binary,
        PathBuf::from("/from/env/scheduler")
    );
}
