//! # Closure-backed agent (`AgentFn`)
//!
//! [`AgentFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`. Every start
//! builds a fresh future, so nothing leaks between restarts unless the closure
//! captures shared state (an `Arc<...>`) on purpose.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use agentvisor::{Agent, AgentError, AgentFn, AgentRef};
//!
//! let ticker: AgentRef = AgentFn::arc("ticker", |ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Err::<(), _>(AgentError::Canceled)
//! });
//!
//! assert_eq!(ticker.name(), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::agents::agent::Agent;
use crate::error::AgentError;

/// Function-backed agent.
pub struct AgentFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> AgentFn<F> {
    /// Creates a new function-backed agent.
    ///
    /// Prefer [`AgentFn::arc`] when an [`AgentRef`](crate::AgentRef) is needed right away.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the agent behind an `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Agent for AgentFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), AgentError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), AgentError> {
        (self.f)(ctx).await
    }
}

impl<F> std::fmt::Debug for AgentFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFn").field("name", &self.name).finish()
    }
}
