//! Per-agent lifecycle state and the public status snapshot.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::error::AgentError;

/// Lifecycle phase of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Stopped,
    Running,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Stopped => "stopped",
            Phase::Running => "running",
        })
    }
}

/// Point-in-time view of one agent, as returned by
/// [`Supervisor::list_agents`](crate::Supervisor::list_agents).
///
/// `restarts` and `last_error` are read in the same critical section, so they
/// always describe the same moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub name: String,
    pub phase: Phase,
    /// Automatic restarts since registration.
    pub restarts: u32,
    /// Most recent failure, kept across restarts.
    pub last_error: Option<AgentError>,
}

impl fmt::Display for AgentStatus {
    /// Renders `name: phase`, then `(N restarts)` and the last error when present.
    ///
    /// ```
    /// use agentvisor::{AgentError, AgentStatus, Phase};
    ///
    /// let status = AgentStatus {
    ///     name: "echo".into(),
    ///     phase: Phase::Running,
    ///     restarts: 2,
    ///     last_error: Some(AgentError::fail("boom")),
    /// };
    /// assert_eq!(
    ///     status.to_string(),
    ///     "echo: running (2 restarts); last error: agent failed: boom",
    /// );
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.phase)?;
        if self.restarts > 0 {
            write!(f, " ({} restarts)", self.restarts)?;
        }
        if let Some(err) = &self.last_error {
            write!(f, "; last error: {err}")?;
        }
        Ok(())
    }
}

/// Mutable run-state of one registration. Guarded by the actor's mutex.
#[derive(Debug)]
pub(crate) struct RunState {
    pub(crate) phase: Phase,
    pub(crate) restarts: u32,
    pub(crate) last_error: Option<AgentError>,
    /// Cancels the current run.
    pub(crate) cancel: Option<CancellationToken>,
    /// Fires when the current run-loop exits.
    pub(crate) done: Option<CancellationToken>,
    /// Set by a stop in progress; suppresses automatic restarts.
    pub(crate) stopping: bool,
    /// Bumped on every start; loops only write state while their epoch is current.
    pub(crate) epoch: u64,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            phase: Phase::Stopped,
            restarts: 0,
            last_error: None,
            cancel: None,
            done: None,
            stopping: false,
            epoch: 0,
        }
    }
}
