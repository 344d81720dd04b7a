//! Process launcher port.
//!
//! The orchestrator starts scheduler, object-store, and worker processes
//! through this interface and never looks inside them. A launch returns as
//! soon as the OS has created the process; readiness is the caller's concern.
//!
//! # Overview
//!
//! - [`LaunchSpec`]: program, arguments, and the address the process binds
//! - [`ProcessLauncher`]: creates processes from a spec
//! - [`ProcessHandle`]: liveness checks and signals for one process

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{Address, Role};
use crate::error::LaunchError;

/// Observed state of a launched process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Still running.
    Running,
    /// Exited, with its exit code when the platform reports one.
    Exited(Option<i32>),
}

impl ProcessStatus {
    #[must_use]
    pub const fn has_exited(self) -> bool {
        matches!(self, ProcessStatus::Exited(_))
    }
}

/// Everything needed to start one cluster process.
///
/// Construct through the role-specific constructors so the positional
/// argument contract of each binary stays in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub role: Role,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// The address this process binds.
    pub address: Address,
}

impl LaunchSpec {
    /// `scheduler <bind_address>`
    #[must_use]
    pub fn scheduler(binary: &Path, bind: &Address) -> Self {
        Self {
            role: Role::Scheduler,
            program: binary.to_path_buf(),
            args: vec![bind.to_string()],
            address: bind.clone(),
        }
    }

    /// `objstore <scheduler_address> <bind_address>`
    #[must_use]
    pub fn object_store(binary: &Path, scheduler: &Address, bind: &Address) -> Self {
        Self {
            role: Role::ObjectStore,
            program: binary.to_path_buf(),
            args: vec![scheduler.to_string(), bind.to_string()],
            address: bind.clone(),
        }
    }

    /// `[interpreter] worker_program --scheduler-address=.. --objstore-address=.. --worker-address=..`
    #[must_use]
    pub fn worker(
        program: &Path,
        interpreter: Option<&str>,
        scheduler: &Address,
        objstore: &Address,
        bind: &Address,
    ) -> Self {
        let flags = [
            format!("--scheduler-address={scheduler}"),
            format!("--objstore-address={objstore}"),
            format!("--worker-address={bind}"),
        ];

        let (program, args) = match interpreter {
            Some(interpreter) => {
                let mut args = vec![program.to_string_lossy().into_owned()];
                args.extend(flags);
                (PathBuf::from(interpreter), args)
            }
            None => (program.to_path_buf(), flags.to_vec()),
        };

        Self {
            role: Role::Worker,
            program,
            args,
            address: bind.clone(),
        }
    }
}

/// A process created by a [`ProcessLauncher`].
///
/// Signal methods are best-effort: sending a signal to a process that has
/// already exited is not an error.
pub trait ProcessHandle: Send + fmt::Debug {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Poll the process without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot report the process state.
    fn status(&mut self) -> std::io::Result<ProcessStatus>;

    /// Send a forceful kill (SIGKILL on Unix).
    ///
    /// # Errors
    ///
    /// Returns an error if the signal could not be delivered.
    fn kill(&mut self) -> std::io::Result<()>;

    /// Ask the process to terminate (SIGTERM on Unix).
    ///
    /// # Errors
    ///
    /// Returns an error if the signal could not be delivered.
    fn terminate(&mut self) -> std::io::Result<()>;
}

/// Creates cluster processes.
pub trait ProcessLauncher: Send + Sync {
    /// Start the process described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Spawn`] if the OS cannot create the process
    /// (missing binary, permissions, resource exhaustion).
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, LaunchError>;
}
