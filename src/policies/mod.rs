//! Restart delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how restart delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy for those delays
//!
//! ## Quick wiring
//! ```text
//! AgentSpec { agent, auto_restart: bool, backoff: BackoffPolicy }
//!      └─► the supervisor run-loop uses:
//!           - auto_restart to decide restart/exit after a failure
//!           - backoff.next(restarts - 1) to schedule the next start
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=100ms, factor=2.0, max=5s, jitter=None.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
