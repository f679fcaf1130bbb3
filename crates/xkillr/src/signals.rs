use std::fmt;

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use thiserror::Error;

use crate::filter::FilteredView;
use crate::process::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KillError {
    #[error("invalid pid {0:?}")]
    InvalidPid(String),
    #[error("refusing to signal xkillr itself")]
    SelfTarget,
    #[error("permission denied")]
    PermissionDenied,
    #[error("no such process")]
    NotFound,
    #[error("{}", .0.desc())]
    Os(Errno),
}

impl From<Errno> for KillError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::EPERM => KillError::PermissionDenied,
            Errno::ESRCH => KillError::NotFound,
            other => KillError::Os(other),
        }
    }
}

/// What happened when the user confirmed a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillOutcome {
    NoSelection,
    Sent {
        pid: String,
        command: String,
    },
    Failed {
        pid: String,
        command: String,
        error: KillError,
    },
}

impl KillOutcome {
    /// Failures stay on screen until the user acknowledges them.
    pub fn needs_acknowledgement(&self) -> bool {
        matches!(self, KillOutcome::Failed { .. })
    }
}

impl fmt::Display for KillOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillOutcome::NoSelection => write!(f, "No process selected"),
            KillOutcome::Sent { pid, command } => {
                write!(f, "Successfully sent SIGTERM to process {pid} ({command})")
            }
            KillOutcome::Failed {
                pid,
                command,
                error,
            } => write!(
                f,
                "Failed to send SIGTERM to process {pid} ({command}): {error}"
            ),
        }
    }
}

/// Delivers SIGTERM to a single pid.
pub trait SignalSender {
    fn terminate(&mut self, pid: Pid) -> Result<(), Errno>;
}

#[derive(Debug, Default)]
pub struct NixSender;

impl SignalSender for NixSender {
    fn terminate(&mut self, pid: Pid) -> Result<(), Errno> {
        kill(pid, Signal::SIGTERM)
    }
}

/// Sends SIGTERM to the process under the cursor.
pub fn terminate<S: SignalSender>(
    sender: &mut S,
    snapshot: &Snapshot,
    view: &FilteredView,
    selected: usize,
) -> KillOutcome {
    if view.is_empty() {
        return KillOutcome::NoSelection;
    }
    let Some(record) = view.get(snapshot, selected) else {
        return KillOutcome::NoSelection;
    };

    let result = target_pid(&record.pid)
        .and_then(|pid| sender.terminate(pid).map_err(KillError::from));

    let outcome = match result {
        Ok(()) => KillOutcome::Sent {
            pid: record.pid.clone(),
            command: record.command.clone(),
        },
        Err(error) => KillOutcome::Failed {
            pid: record.pid.clone(),
            command: record.command.clone(),
            error,
        },
    };

    if outcome.needs_acknowledgement() {
        log::warn!("{outcome}");
    } else {
        log::info!("{outcome}");
    }
    outcome
}

fn target_pid(raw: &str) -> Result<Pid, KillError> {
    let pid: i32 = raw
        .parse()
        .map_err(|_| KillError::InvalidPid(raw.to_string()))?;
    // zero and negative pids address process groups
    if pid <= 0 {
        return Err(KillError::InvalidPid(raw.to_string()));
    }
    if pid as u32 == std::process::id() {
        return Err(KillError::SelfTarget);
    }
    Ok(Pid::from_raw(pid))
}
