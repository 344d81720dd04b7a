//! Escalating termination protocol for one process.
//!
//! ```text
//! Running ──exited──► AlreadyExited
//!    │
//!    ▼ kill
//! KillSent ──exited──► Killed
//!    │
//!    ▼ terminate
//! TerminateSent ──exited──► Terminated
//!    │
//!    ▼
//! Unresponsive
//! ```
//!
//! Each arrow out of `KillSent` and `TerminateSent` is taken after a bounded
//! wait, so the protocol always finishes in at most two grace periods.

use std::fmt;

use serde::Serialize;

/// Final result of stopping one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    /// Process had exited before teardown reached it. No signal was sent.
    AlreadyExited,
    /// Process exited after the forceful kill.
    Killed,
    /// Process exited after the graceful terminate.
    Terminated,
    /// Process was still running after both signals.
    Unresponsive,
}

impl TerminationOutcome {
    /// True when the process is confirmed gone.
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        !matches!(self, TerminationOutcome::Unresponsive)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TerminationOutcome::AlreadyExited => "already_exited",
            TerminationOutcome::Killed => "killed",
            TerminationOutcome::Terminated => "terminated",
            TerminationOutcome::Unresponsive => "unresponsive",
        }
    }
}

impl fmt::Display for TerminationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a process is in the termination protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationState {
    /// Not yet checked.
    Running,
    /// A forceful kill is due (or was just sent).
    KillSent,
    /// A graceful terminate is due (or was just sent).
    TerminateSent,
    /// Protocol finished.
    Done(TerminationOutcome),
}

impl TerminationState {
    /// Advance the protocol given whether the process was seen to have exited
    /// at the end of the current step.
    #[must_use]
    pub const fn observe(self, exited: bool) -> Self {
        use TerminationOutcome::{AlreadyExited, Killed, Terminated, Unresponsive};

        match (self, exited) {
            (TerminationState::Running, true) => TerminationState::Done(AlreadyExited),
            (TerminationState::Running, false) => TerminationState::KillSent,
            (TerminationState::KillSent, true) => TerminationState::Done(Killed),
            (TerminationState::KillSent, false) => TerminationState::TerminateSent,
            (TerminationState::TerminateSent, true) => TerminationState::Done(Terminated),
            (TerminationState::TerminateSent, false) => TerminationState::Done(Unresponsive),
            (done @ TerminationState::Done(_), _) => done,
        }
    }

    /// The outcome, once the protocol is finished.
    #[must_use]
    pub const fn outcome(self) -> Option<TerminationOutcome> {
        match self {
            TerminationState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }
}
