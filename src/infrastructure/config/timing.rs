//! Settle intervals between bootstrap stages and teardown grace periods.

use std::time::Duration;

use serde::Deserialize;

use crate::application::{SettleTimings, ShutdownPolicy};

/// Fixed waits after each bootstrap stage (milliseconds).
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_scheduler_settle_ms")]
    pub scheduler_settle_ms: u64,
    #[serde(default = "default_objstore_settle_ms")]
    pub objstore_settle_ms: u64,
    #[serde(default = "default_workers_settle_ms")]
    pub workers_settle_ms: u64,
    #[serde(default = "default_driver_settle_ms")]
    pub driver_settle_ms: u64,
}

fn default_scheduler_settle_ms() -> u64 {
    100
}

fn default_objstore_settle_ms() -> u64 {
    200
}

fn default_workers_settle_ms() -> u64 {
    300
}

fn default_driver_settle_ms() -> u64 {
    500
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            scheduler_settle_ms: default_scheduler_settle_ms(),
            objstore_settle_ms: default_objstore_settle_ms(),
            workers_settle_ms: default_workers_settle_ms(),
            driver_settle_ms: default_driver_settle_ms(),
        }
    }
}

impl TimingConfig {
    #[must_use]
    pub fn settle_timings(&self) -> SettleTimings {
        SettleTimings {
            scheduler: Duration::from_millis(self.scheduler_settle_ms),
            object_store: Duration::from_millis(self.objstore_settle_ms),
            workers: Duration::from_millis(self.workers_settle_ms),
            drivers: Duration::from_millis(self.driver_settle_ms),
        }
    }
}

/// Grace periods for the kill / terminate protocol (milliseconds).
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    #[serde(default = "default_grace_ms")]
    pub kill_grace_ms: u64,
    #[serde(default = "default_grace_ms")]
    pub terminate_grace_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_grace_ms() -> u64 {
    50
}

fn default_poll_interval_ms() -> u64 {
    10
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            kill_grace_ms: default_grace_ms(),
            terminate_grace_ms: default_grace_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ShutdownConfig {
    #[must_use]
    pub fn policy(&self) -> ShutdownPolicy {
        ShutdownPolicy {
            kill_grace: Duration::from_millis(self.kill_grace_ms),
            terminate_grace: Duration::from_millis(self.terminate_grace_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}
