//! Error types used by the bus, the supervisor and agents.
//!
//! - [`BusError`] - operations attempted on a closed [`Bus`](crate::Bus).
//! - [`AgentError`] - outcome of a single [`Agent::start`](crate::Agent::start) call.
//! - [`SupervisorError`] - per-agent control operations.
//! - [`RuntimeError`] - whole-runtime shutdown.
//!
//! Every enum provides `as_label` (snake_case, stable) for logs.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the event bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was closed; no further subscriptions or deliveries are accepted.
    #[error("bus closed")]
    Closed,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::Closed => "bus_closed",
        }
    }
}

/// # Errors returned by an agent run.
///
/// [`AgentError::Canceled`] is a clean exit and is never retried.
/// [`AgentError::Fail`] is a worker failure; the supervisor restarts the agent
/// when its registration allows it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Agent failed; may succeed if started again.
    #[error("agent failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Agent observed cancellation of its context.
    #[error("context cancelled")]
    Canceled,
}

impl AgentError {
    /// Shorthand for [`AgentError::Fail`].
    ///
    /// # Example
    /// ```
    /// use agentvisor::AgentError;
    ///
    /// let err = AgentError::fail("connection refused");
    /// assert_eq!(err.to_string(), "agent failed: connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        AgentError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentError::Fail { .. } => "agent_failed",
            AgentError::Canceled => "agent_canceled",
        }
    }

    /// True for the cancellation flavour of the error.
    pub fn is_canceled(&self) -> bool {
        matches!(self, AgentError::Canceled)
    }
}

impl From<BusError> for AgentError {
    fn from(err: BusError) -> Self {
        AgentError::fail(err.to_string())
    }
}

/// # Errors produced by supervisor control operations.
///
/// Unknown agent names are not errors: control operations on them are no-ops.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    /// The agent did not signal completion within the stop timeout.
    ///
    /// The agent is marked stopped anyway; its task may still be running.
    #[error("agent {name:?} did not stop within {timeout:?}")]
    StopTimeout {
        /// Agent name.
        name: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The root token is cancelled; no agent can be started any more.
    #[error("supervisor is shut down")]
    ShutDown,
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use agentvisor::SupervisorError;
    /// use std::time::Duration;
    ///
    /// let err = SupervisorError::StopTimeout {
    ///     name: "echo".into(),
    ///     timeout: Duration::from_secs(5),
    /// };
    /// assert_eq!(err.as_label(), "agent_stop_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::StopTimeout { .. } => "agent_stop_timeout",
            SupervisorError::ShutDown => "supervisor_shut_down",
        }
    }
}

/// # Errors produced while shutting the whole runtime down.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Grace period elapsed while some agents were still running.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of agents that did not finish in time.
        stuck: Vec<String>,
    },

    /// Installing the OS signal listeners failed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}
