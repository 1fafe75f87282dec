//! # Agent abstraction.
//!
//! An [`Agent`] is a long-running, cancelable worker with a stable name. The
//! supervisor calls [`Agent::start`] and, depending on the outcome and the
//! registration, calls it again later. Each call receives a fresh
//! [`CancellationToken`] derived from the supervisor's root token.
//!
//! The common handle type is [`AgentRef`], an `Arc<dyn Agent>`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;

/// # Asynchronous, cancelable worker.
///
/// `start` should run until the work is done or `ctx` is cancelled. On
/// cancellation it must return promptly, preferably with
/// [`AgentError::Canceled`]; any error returned after the token fired is
/// treated as a clean stop.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use agentvisor::{Agent, AgentError};
///
/// struct Idle;
///
/// #[async_trait]
/// impl Agent for Idle {
///     fn name(&self) -> &str { "idle" }
///
///     async fn start(&self, ctx: CancellationToken) -> Result<(), AgentError> {
///         ctx.cancelled().await;
///         Err(AgentError::Canceled)
///     }
/// }
/// ```
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    /// Returns a stable name, unique within one supervisor.
    fn name(&self) -> &str;

    /// Runs the agent until completion, failure or cancellation.
    async fn start(&self, ctx: CancellationToken) -> Result<(), AgentError>;
}

/// Shared handle to an agent.
pub type AgentRef = Arc<dyn Agent>;
