//! Operating-system process launcher.
//!
//! Spawns cluster binaries with [`tokio::process::Command`]. Children inherit
//! the orchestrator's stdout and stderr so their logs interleave with ours,
//! and they are not killed on drop: teardown is explicit.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::LaunchError;
use crate::port::outbound::process::{LaunchSpec, ProcessHandle, ProcessLauncher, ProcessStatus};

/// Launches real OS processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsProcessLauncher;

impl OsProcessLauncher {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for OsProcessLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                role: spec.role,
                program: spec.program.clone(),
                source,
            })?;

        debug!(
            role = %spec.role,
            program = %spec.program.display(),
            pid = ?child.id(),
            "Spawned process"
        );

        Ok(Box::new(OsProcess { child }))
    }
}

/// A child process spawned by [`OsProcessLauncher`].
#[derive(Debug)]
pub struct OsProcess {
    child: Child,
}

impl ProcessHandle for OsProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn status(&mut self) -> std::io::Result<ProcessStatus> {
        Ok(match self.child.try_wait()? {
            Some(status) => ProcessStatus::Exited(status.code()),
            None => ProcessStatus::Running,
        })
    }

    fn kill(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> std::io::Result<()> {
        // id() is None once the child has been reaped; nothing left to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = libc::pid_t::try_from(pid).map_err(std::io::Error::other)?;

        // SAFETY: kill(2) has no memory-safety preconditions; pid belongs to
        // a child we have not reaped, so it cannot have been recycled.
        let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> std::io::Result<()> {
        self.child.start_kill()
    }
}
