//! Scripted process launcher.
//!
//! [`FakeLauncher`] hands out [`FakeProcess`] handles whose reaction to
//! signals is chosen per role. Launches and signals are recorded in shared
//! state so tests can inspect them after the orchestrator has dropped its
//! handles.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::Role;
use crate::error::LaunchError;
use crate::port::outbound::process::{LaunchSpec, ProcessHandle, ProcessLauncher, ProcessStatus};

/// How a fake process reacts to signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FakeBehavior {
    /// Exits on kill.
    #[default]
    Running,
    /// Has already exited when teardown starts.
    Exited,
    /// Ignores kill, exits on terminate.
    IgnoresKill,
    /// Never exits.
    Unkillable,
    /// Signal delivery fails; the process stays up.
    SignalFails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Kill,
    Terminate,
}

#[derive(Debug, Default)]
struct LauncherState {
    behaviors: HashMap<Role, FakeBehavior>,
    fail_roles: HashSet<Role>,
    fail_after: Option<usize>,
    launches: Vec<LaunchSpec>,
    signals: Vec<(u32, Signal)>,
    exited: HashSet<u32>,
}

/// Launcher that never touches the OS.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    state: Arc<Mutex<LauncherState>>,
}

impl FakeLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes of `role` behave as `behavior`.
    #[must_use]
    pub fn with_behavior(self, role: Role, behavior: FakeBehavior) -> Self {
        self.state.lock().behaviors.insert(role, behavior);
        self
    }

    /// Every launch of `role` fails.
    #[must_use]
    pub fn failing_role(self, role: Role) -> Self {
        self.state.lock().fail_roles.insert(role);
        self
    }

    /// The first `n` launches succeed, every later one fails.
    #[must_use]
    pub fn failing_after(self, n: usize) -> Self {
        self.state.lock().fail_after = Some(n);
        self
    }

    /// Successful launches in order.
    #[must_use]
    pub fn launches(&self) -> Vec<LaunchSpec> {
        self.state.lock().launches.clone()
    }

    #[must_use]
    pub fn launched(&self, role: Role) -> Vec<LaunchSpec> {
        self.launches()
            .into_iter()
            .filter(|spec| spec.role == role)
            .collect()
    }

    /// Signals delivered, as `(pid, signal)`.
    #[must_use]
    pub fn signals(&self) -> Vec<(u32, Signal)> {
        self.state.lock().signals.clone()
    }

    /// Signals delivered to one pid.
    #[must_use]
    pub fn signals_for(&self, pid: u32) -> Vec<Signal> {
        self.signals()
            .into_iter()
            .filter(|(p, _)| *p == pid)
            .map(|(_, signal)| signal)
            .collect()
    }

    /// Launched processes that have not exited.
    #[must_use]
    pub fn alive(&self) -> usize {
        let state = self.state.lock();
        state.launches.len() - state.exited.len()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, spec: &LaunchSpec) -> Result<Box<dyn ProcessHandle>, LaunchError> {
        let mut state = self.state.lock();

        let over_limit = state.fail_after.is_some_and(|n| state.launches.len() >= n);
        if over_limit || state.fail_roles.contains(&spec.role) {
            return Err(LaunchError::Spawn {
                role: spec.role,
                program: spec.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted launch failure"),
            });
        }

        let pid = 1000 + u32::try_from(state.launches.len()).unwrap_or(u32::MAX - 1000);
        let behavior = state.behaviors.get(&spec.role).copied().unwrap_or_default();
        if behavior == FakeBehavior::Exited {
            state.exited.insert(pid);
        }
        state.launches.push(spec.clone());

        Ok(Box::new(FakeProcess {
            pid,
            behavior,
            state: Arc::clone(&self.state),
        }))
    }
}

/// Handle produced by [`FakeLauncher`].
#[derive(Debug)]
pub struct FakeProcess {
    pid: u32,
    behavior: FakeBehavior,
    state: Arc<Mutex<LauncherState>>,
}

impl FakeProcess {
    fn record(&self, signal: Signal, exits: bool) -> io::Result<()> {
        let mut state = self.state.lock();
        if self.behavior == FakeBehavior::SignalFails {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "scripted signal failure",
            ));
        }
        state.signals.push((self.pid, signal));
        if exits {
            state.exited.insert(self.pid);
        }
        Ok(())
    }
}

impl ProcessHandle for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn status(&mut self) -> io::Result<ProcessStatus> {
        if self.state.lock().exited.contains(&self.pid) {
            Ok(ProcessStatus::Exited(Some(0)))
        } else {
            Ok(ProcessStatus::Running)
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        let exits = self.behavior == FakeBehavior::Running;
        self.record(Signal::Kill, exits)
    }

    fn terminate(&mut self) -> io::Result<()> {
        let exits = matches!(self.behavior, FakeBehavior::Running | FakeBehavior::IgnoresKill);
        self.record(Signal::Terminate, exits)
    }
}

/// Program path used for fake workers.
#[must_use]
pub fn worker_program() -> PathBuf {
    PathBuf::from("worker.py")
}
