//! Configuration loading and validation.
//!
//! [`Config`] aggregates every section of the cluster TOML file. All sections
//! are optional; an empty file describes a local cluster with one scheduler,
//! one object store and no workers.
//!
//! # Example
//!
//! ```no_run
//! use hatchery::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("cluster.toml")?;
//!     config.init_logging();
//!     let request = config.cluster_request();
//!     println!("{} object stores", request.num_objstores);
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::cluster::{BinariesConfig, ClusterConfig};
use super::logging::LoggingConfig;
use super::readiness::{ReadinessConfig, ReadinessMode};
use super::timing::{ShutdownConfig, TimingConfig};
use crate::application::{ClusterRequest, OrchestratorSettings};
use crate::error::{ConfigError, Result};

/// Environment variable that overrides `binaries.services_dir`.
pub const SERVICES_DIR_ENV: &str = "HATCHERY_SERVICES_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub binaries: BinariesConfig,

    /// Settle intervals between bootstrap stages.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Kill / terminate grace periods.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies the `HATCHERY_SERVICES_DIR` override before validating.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Defaults plus environment overrides, for running without a file.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Some(dir) = std::env::var_os(SERVICES_DIR_ENV).filter(|dir| !dir.is_empty()) {
            self.binaries.services_dir = Some(PathBuf::from(dir));
        }
    }

    /// Check value ranges and cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] describing the first offending
    /// field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.cluster.host.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "host" }.into());
        }
        self.cluster_request().validate()?;

        if self.binaries.scheduler.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "scheduler" }.into());
        }
        if self.binaries.objstore.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "objstore" }.into());
        }

        if self.shutdown.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.readiness.mode == ReadinessMode::Probe {
            let readiness = &self.readiness;
            if readiness.max_attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "max_attempts",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
            if readiness.initial_delay_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "initial_delay_ms",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
            if readiness.max_delay_ms < readiness.initial_delay_ms {
                return Err(ConfigError::InvalidValue {
                    field: "max_delay_ms",
                    reason: "must be >= initial_delay_ms".to_string(),
                }
                .into());
            }
            if readiness.backoff_multiplier < 1.0 {
                return Err(ConfigError::InvalidValue {
                    field: "backoff_multiplier",
                    reason: "must be >= 1.0".to_string(),
                }
                .into());
            }
            if readiness.connect_timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "connect_timeout_ms",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// The bootstrap request described by `[cluster]`.
    #[must_use]
    pub fn cluster_request(&self) -> ClusterRequest {
        ClusterRequest {
            scheduler_address: self.cluster.scheduler_address.clone(),
            num_objstores: self.cluster.num_objstores,
            workers_per_objstore: self.cluster.workers_per_objstore,
            worker_program: self.cluster.worker_program.clone(),
            return_drivers: self.cluster.return_drivers,
        }
    }

    /// Orchestrator settings with binary paths resolved.
    #[must_use]
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            host: self.cluster.host.clone(),
            scheduler_binary: self.binaries.scheduler_path(),
            objstore_binary: self.binaries.objstore_path(),
            worker_interpreter: self.cluster.worker_interpreter.clone(),
            rollback_on_failure: self.cluster.rollback_on_failure,
            shutdown: self.shutdown.policy(),
        }
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
