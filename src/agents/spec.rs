//! # Agent registration.
//!
//! [`AgentSpec`] bundles an agent with the policy the supervisor applies to it:
//! whether failures restart it and how long to wait between restarts.
//!
//! A spec can be created:
//! - **Explicitly** with [`AgentSpec::new`]
//! - **From config** with [`AgentSpec::with_defaults`] (inherits the default backoff)

use crate::{agents::agent::AgentRef, config::Config, policies::BackoffPolicy};

/// Specification for running an agent under supervision.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use agentvisor::{AgentError, AgentFn, AgentRef, AgentSpec, BackoffPolicy, Config};
///
/// let worker: AgentRef = AgentFn::arc("worker", |_ctx: CancellationToken| async {
///     Ok::<(), AgentError>(())
/// });
///
/// let spec = AgentSpec::with_defaults(worker.clone(), true, &Config::default());
/// assert_eq!(spec.backoff().first, Duration::from_millis(100));
///
/// let spec = AgentSpec::new(worker, false)
///     .with_backoff(BackoffPolicy::exponential(Duration::from_millis(10), Duration::from_secs(1)));
/// assert!(!spec.auto_restart());
/// ```
#[derive(Clone)]
pub struct AgentSpec {
    agent: AgentRef,
    auto_restart: bool,
    backoff: BackoffPolicy,
}

impl AgentSpec {
    /// Creates a spec with the default backoff policy.
    pub fn new(agent: AgentRef, auto_restart: bool) -> Self {
        Self {
            agent,
            auto_restart,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Creates a spec inheriting the backoff policy from `cfg`.
    pub fn with_defaults(agent: AgentRef, auto_restart: bool, cfg: &Config) -> Self {
        Self {
            agent,
            auto_restart,
            backoff: cfg.backoff,
        }
    }

    /// Returns the agent.
    pub fn agent(&self) -> &AgentRef {
        &self.agent
    }

    /// Convenience: returns the agent name.
    pub fn name(&self) -> &str {
        self.agent.name()
    }

    /// Whether failures restart the agent.
    pub fn auto_restart(&self) -> bool {
        self.auto_restart
    }

    /// Returns the backoff policy.
    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// Returns a new spec with updated backoff.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns a new spec with updated restart flag.
    pub fn with_auto_restart(mut self, auto_restart: bool) -> Self {
        self.auto_restart = auto_restart;
        self
    }
}

impl std::fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpec")
            .field("name", &self.name())
            .field("auto_restart", &self.auto_restart)
            .field("backoff", &self.backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentFn;
    use crate::error::AgentError;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn setters_override_defaults() {
        let agent = AgentFn::arc("w", |_ctx: CancellationToken| async {
            Ok::<(), AgentError>(())
        });
        let cfg = Config {
            backoff: BackoffPolicy::exponential(Duration::from_secs(1), Duration::from_secs(2)),
            ..Config::default()
        };

        let spec = AgentSpec::with_defaults(agent, true, &cfg);
        assert_eq!(spec.name(), "w");
        assert!(spec.auto_restart());
        assert_eq!(spec.backoff().first, Duration::from_secs(1));

        let spec = spec.with_auto_restart(false);
        assert!(!spec.auto_restart());
        assert_eq!(spec.backoff().max, Duration::from_secs(2));
    }
}
