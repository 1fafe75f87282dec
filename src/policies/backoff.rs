//! # Backoff policy for restarting agents.
//!
//! [`BackoffPolicy`] controls how restart delays grow after repeated failures.
//! It is parameterized by:
//! - [`BackoffPolicy::first`] the delay before the first restart (minimum backoff);
//! - [`BackoffPolicy::max`] the maximum delay cap;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor.
//!
//! The supervisor asks for `next(restarts - 1)`, so with the default doubling
//! factor the n-th restart waits `first × 2^(n-1)`, clamped to `max`. Jitter is
//! applied to the clamped base and never feeds back into later attempts.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use agentvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(5),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // First restart waits `first`.
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! // Third restart: 100ms × 2^2.
//! assert_eq!(backoff.next(2), Duration::from_millis(400));
//! // 100ms × 2^10 = 102.4s → capped at max.
//! assert_eq!(backoff.next(10), Duration::from_secs(5));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Restart backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first restart.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy; `None` keeps delays deterministic.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 100ms`;
    /// - `max = 5s`;
    /// - `factor = 2.0` (doubling);
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Creates a doubling policy without jitter.
    pub fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            ..Self::default()
        }
    }

    /// Computes the delay for the given 0-indexed restart.
    ///
    /// The base delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`].
    /// Overflowing or non-finite intermediate values clamp to `max` as well.
    pub fn next(&self, attempt: u32) -> Duration {
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        // Float rounding can put `unclamped_secs` past what a Duration holds even
        // when it compares equal to `max`.
        let base = Duration::try_from_secs_f64(unclamped_secs)
            .map_or(self.max, |d| d.min(self.max));

        self.jitter.apply(base, self.first.min(self.max), self.max)
    }
}
