//! # Runtime configuration.
//!
//! Provides [`Config`] centralized settings for the bus and the supervisor.
//!
//! Config is used in three ways:
//! 1. **Bus creation**: `Bus::new(config.bus_buffer_clamped())`
//! 2. **Supervisor creation**: `Supervisor::new(config, root_token)`
//! 3. **AgentSpec defaults**: `AgentSpec::with_defaults(agent, auto_restart, &config)`
//!
//! ## Sentinel values
//! - `bus_buffer = 0` → clamped to 1 (a subscription always holds at least one event)
//! - `stop_timeout = 0s` → `stop_agent` does not wait for completion at all

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Configuration for the bus and the supervisor.
///
/// ## Field semantics
/// - `bus_buffer`: queue size used when `subscribe` is asked for a zero-sized buffer
/// - `backoff`: default restart backoff for agents registered with `register`
/// - `stop_timeout`: upper bound on how long `stop_agent` waits for a loop to finish
/// - `grace`: upper bound on how long `shutdown` waits for all loops to finish
#[derive(Clone, Debug)]
pub struct Config {
    /// Default per-subscription queue size.
    pub bus_buffer: usize,

    /// Default backoff policy for restarted agents.
    ///
    /// Used by `Supervisor::register()`. Can be overridden per agent via `AgentSpec`.
    pub backoff: BackoffPolicy,

    /// Maximum time `stop_agent` waits for the run-loop to signal completion.
    ///
    /// On expiry the agent is marked stopped regardless and
    /// `SupervisorError::StopTimeout` is returned.
    pub stop_timeout: Duration,

    /// Maximum time `shutdown` waits for every run-loop after cancelling the root token.
    pub grace: Duration,
}

impl Config {
    /// Returns a bus buffer clamped to a minimum of 1.
    #[inline]
    pub fn bus_buffer_clamped(&self) -> usize {
        self.bus_buffer.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_buffer = 64`
    /// - `backoff = BackoffPolicy::default()` (100ms doubling up to 5s)
    /// - `stop_timeout = 5s`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            bus_buffer: 64,
            backoff: BackoffPolicy::default(),
            stop_timeout: Duration::from_secs(5),
            grace: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_buffer_is_clamped() {
        let cfg = Config {
            bus_buffer: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_buffer_clamped(), 1);
        assert_eq!(Config::default().bus_buffer_clamped(), 64);
    }
}
