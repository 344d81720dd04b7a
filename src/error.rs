use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::{Address, DriverId, Role};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures to bring a cluster process into existence.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to spawn {role} '{}': {source}", .program.display())]
    Spawn {
        role: Role,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot allocate address: {0}")]
    Ports(#[from] DomainError),
}

/// A launched process never started accepting connections.
#[derive(Error, Debug)]
pub enum ReadinessError {
    #[error("{role} at {address} not ready after {attempts} attempts")]
    NotReadyYet {
        role: Role,
        address: Address,
        attempts: u32,
    },
}

/// Non-fatal problems seen during teardown.
///
/// These are logged and collected in the shutdown report; they never abort
/// teardown of the remaining processes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShutdownWarning {
    #[error("could not signal {role} at {address}: {reason}")]
    SignalFailed {
        role: Role,
        address: Address,
        reason: String,
    },

    #[error("{role} at {address} (pid {pid:?}) did not stop after kill and terminate")]
    Unresponsive {
        role: Role,
        address: Address,
        pid: Option<u32>,
    },

    #[error("failed to disconnect driver {}: {reason}", driver_label(.driver))]
    DisconnectFailed {
        driver: Option<DriverId>,
        reason: String,
    },
}

fn driver_label(driver: &Option<DriverId>) -> String {
    driver.map_or_else(|| "<implicit>".to_string(), |id| id.to_string())
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
