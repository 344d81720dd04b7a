//! Readiness strategy configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::application::{BackoffPolicy, ProbePolicy};

/// How the orchestrator decides a stage is ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessMode {
    /// Wait the fixed settle intervals from `[timing]`.
    #[default]
    Settle,
    /// Probe each launched address over TCP with backoff.
    Probe,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default)]
    pub mode: ReadinessMode,
    /// Probe attempts per address before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Timeout for a single TCP connect attempt.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    20
}

fn default_initial_delay_ms() -> u64 {
    50
}

fn default_max_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_connect_timeout_ms() -> u64 {
    200
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            mode: ReadinessMode::default(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ReadinessConfig {
    #[must_use]
    pub fn probe_policy(&self) -> ProbePolicy {
        ProbePolicy {
            max_attempts: self.max_attempts,
            backoff: BackoffPolicy {
                first: Duration::from_millis(self.initial_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
                factor: self.backoff_multiplier,
                jitter: true,
            },
        }
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
