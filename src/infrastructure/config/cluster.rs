//! Cluster topology and binary location configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::Address;

/// Shape of the cluster to start.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Host every allocated address uses.
    #[serde(default = "default_host")]
    pub host: String,
    /// Join an existing scheduler instead of launching one.
    #[serde(default)]
    pub scheduler_address: Option<Address>,
    #[serde(default = "default_num_objstores")]
    pub num_objstores: usize,
    #[serde(default)]
    pub workers_per_objstore: usize,
    /// Program each worker runs. Required when `workers_per_objstore > 0`.
    #[serde(default)]
    pub worker_program: Option<PathBuf>,
    /// Interpreter to run the worker program with (e.g. `python`).
    #[serde(default)]
    pub worker_interpreter: Option<String>,
    /// Connect one explicit driver per object store instead of the implicit one.
    #[serde(default)]
    pub return_drivers: bool,
    /// Stop already launched processes if bootstrap fails part-way.
    #[serde(default)]
    pub rollback_on_failure: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_num_objstores() -> usize {
    1
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            scheduler_address: None,
            num_objstores: default_num_objstores(),
            workers_per_objstore: 0,
            worker_program: None,
            worker_interpreter: None,
            return_drivers: false,
            rollback_on_failure: false,
        }
    }
}

/// Where the scheduler and object-store binaries live.
#[derive(Debug, Clone, Deserialize)]
pub struct BinariesConfig {
    /// Directory relative binary paths are resolved against.
    ///
    /// Overridden by the `HATCHERY_SERVICES_DIR` environment variable.
    #[serde(default)]
    pub services_dir: Option<PathBuf>,
    #[serde(default = "default_scheduler")]
    pub scheduler: PathBuf,
    #[serde(default = "default_objstore")]
    pub objstore: PathBuf,
}

fn default_scheduler() -> PathBuf {
    PathBuf::from("scheduler")
}

fn default_objstore() -> PathBuf {
    PathBuf::from("objstore")
}

impl Default for BinariesConfig {
    fn default() -> Self {
        Self {
            services_dir: None,
            scheduler: default_scheduler(),
            objstore: default_objstore(),
        }
    }
}

impl BinariesConfig {
    /// Full path of the scheduler binary.
    #[must_use]
    pub fn scheduler_path(&self) -> PathBuf {
        self.resolve(&self.scheduler)
    }

    /// Full path of the object-store binary.
    #[must_use]
    pub fn objstore_path(&self) -> PathBuf {
        self.resolve(&self.objstore)
    }

    fn resolve(&self, binary: &Path) -> PathBuf {
        match &self.services_dir {
            Some(dir) if binary.is_relative() => dir.join(binary),
            _ => binary.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_binaries_resolve_against_services_dir() {
        let binaries = BinariesConfig {
            services_dir: Some(PathBuf::from("/opt/cluster/bin")),
            scheduler: PathBuf::from("scheduler"),
            objstore: PathBuf::from("/usr/local/bin/objstore"),
        };
        assert_eq!(
            binaries.scheduler_path(),
            PathBuf::from("/opt/cluster/bin/scheduler")
        );
        assert_eq!(
            binaries.objstore_path(),
            PathBuf::from("/usr/local/bin/objstore")
        );
    }

    #[test]
    fn without_services_dir_paths_pass_through() {
        let binaries = BinariesConfig::default();
        assert_eq!(binaries.scheduler_path(), PathBuf::from("scheduler"));
    }
}
