//! # Supervisor: named agents with restart-on-failure.
//!
//! The supervisor owns a registry of [`AgentActor`]s bound to one root
//! [`CancellationToken`]. Each start derives a child token from the root, so
//! cancelling the root (or calling [`Supervisor::shutdown`]) reaches every run.
//!
//! ```text
//! register(agent) ──► Registry ──► AgentActor (Stopped)
//! start_agent ──────► AgentActor::begin ──► spawn(run-loop)
//! stop_agent ───────► cancel run token ──► wait done (≤ stop_timeout)
//! list_agents ──────► per-actor snapshot, sorted by name
//! shutdown ─────────► cancel root ──► wait every done (≤ grace)
//! ```
//!
//! The supervisor never looks at event types; agents that talk over a
//! [`Bus`](crate::Bus) capture it themselves.

use std::sync::Arc;

use futures::future::join_all;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::agents::{AgentRef, AgentSpec};
use crate::config::Config;
use crate::core::actor::AgentActor;
use crate::core::registry::Registry;
use crate::core::shutdown;
use crate::core::state::AgentStatus;
use crate::error::{RuntimeError, SupervisorError};

/// Keeps registered agents alive.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use agentvisor::{AgentError, AgentFn, Config, Phase, Supervisor};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let sup = Supervisor::new(Config::default(), CancellationToken::new());
///     sup.register(
///         AgentFn::arc("idle", |ctx: CancellationToken| async move {
///             ctx.cancelled().await;
///             Err::<(), _>(AgentError::Canceled)
///         }),
///         true,
///     )
///     .await;
///
///     sup.start_agent("idle").await.unwrap();
///     assert_eq!(sup.list_agents().await[0].phase, Phase::Running);
///
///     sup.shutdown().await.unwrap();
///     assert_eq!(sup.list_agents().await[0].phase, Phase::Stopped);
/// }
/// ```
pub struct Supervisor {
    cfg: Config,
    root: CancellationToken,
    registry: Registry,
}

impl Supervisor {
    /// Creates a supervisor whose runs all derive from `root`.
    pub fn new(cfg: Config, root: CancellationToken) -> Self {
        Self {
            cfg,
            root,
            registry: Registry::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Root token shared with the host. Cancelling it stops every agent.
    pub fn root_token(&self) -> &CancellationToken {
        &self.root
    }

    /// Registers `agent` with the configured default backoff.
    ///
    /// See [`register_spec`](Self::register_spec) for replacement rules.
    pub async fn register(&self, agent: AgentRef, auto_restart: bool) {
        let spec = AgentSpec::with_defaults(agent, auto_restart, &self.cfg);
        self.register_spec(spec).await;
    }

    /// Registers an agent in `Stopped` state with zero restarts.
    ///
    /// An existing registration with the same name is replaced. If it is
    /// running it is stopped first, so its loop does not outlive the entry.
    pub async fn register_spec(&self, spec: AgentSpec) {
        let name = spec.name().to_owned();
        if let Some(existing) = self.registry.get(&name).await {
            tracing::warn!(agent = %name, "replacing registered agent");
            self.drain(&existing).await;
        }

        // A start may have slipped in between the drain and the insert.
        if let Some(displaced) = self.registry.insert(AgentActor::new(spec)).await {
            self.drain(&displaced).await;
        }
        tracing::debug!(agent = %name, "agent registered");
    }

    /// Starts the named agent and returns without waiting for it.
    ///
    /// No-op for unknown names, running agents and agents being stopped.
    ///
    /// # Errors
    /// [`SupervisorError::ShutDown`] once the root token is cancelled.
    pub async fn start_agent(&self, name: &str) -> Result<(), SupervisorError> {
        let Some(actor) = self.lookup(name).await else {
            return Ok(());
        };
        if self.root.is_cancelled() {
            return Err(SupervisorError::ShutDown);
        }
        let Some(launch) = actor.begin(&self.root).await else {
            tracing::debug!(agent = %name, "agent already running");
            return Ok(());
        };

        tracing::info!(agent = %name, "starting agent");
        tokio::spawn(Arc::clone(&actor).run(launch));
        Ok(())
    }

    /// Stops the named agent and waits up to `stop_timeout` for its loop to exit.
    ///
    /// No-op unless the agent is running. The agent ends up `Stopped` either way.
    ///
    /// # Errors
    /// [`SupervisorError::StopTimeout`] when the loop did not finish in time.
    pub async fn stop_agent(&self, name: &str) -> Result<(), SupervisorError> {
        let Some(actor) = self.lookup(name).await else {
            return Ok(());
        };
        self.stop_actor(&actor).await
    }

    /// Stops, then starts the named agent.
    ///
    /// The start happens even when the stop timed out; the timeout is logged.
    pub async fn restart_agent(&self, name: &str) -> Result<(), SupervisorError> {
        if let Err(err) = self.stop_agent(name).await {
            tracing::warn!(agent = %name, error = %err, "restarting after unclean stop");
        }
        self.start_agent(name).await
    }

    /// Status of every registered agent, sorted by name.
    pub async fn list_agents(&self) -> Vec<AgentStatus> {
        let actors = self.registry.snapshot().await;
        let mut out = Vec::with_capacity(actors.len());
        for actor in actors {
            out.push(actor.status().await);
        }
        out.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Starts every registered agent.
    pub async fn start_all(&self) {
        for name in self.registry.names().await {
            if let Err(err) = self.start_agent(&name).await {
                tracing::warn!(agent = %name, error = %err, "start failed");
            }
        }
    }

    /// Stops every registered agent concurrently.
    pub async fn stop_all(&self) {
        let names = self.registry.names().await;
        let results = join_all(names.iter().map(|name| self.stop_agent(name))).await;
        for (name, res) in names.iter().zip(results) {
            if let Err(err) = res {
                tracing::warn!(agent = %name, error = %err, "stop failed");
            }
        }
    }

    /// Cancels the root token and waits up to `grace` for every run-loop to exit.
    ///
    /// # Errors
    /// [`RuntimeError::GraceExceeded`] listing the agents still running.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        tracing::info!("shutdown requested");
        self.root.cancel();

        let mut running = Vec::new();
        for actor in self.registry.snapshot().await {
            if let Some(done) = actor.running_signal().await {
                running.push((actor, done));
            }
        }

        let grace = self.cfg.grace;
        let all_done = join_all(running.iter().map(|(_, done)| done.cancelled()));
        if time::timeout(grace, all_done).await.is_ok() {
            tracing::info!("all agents stopped");
            return Ok(());
        }

        let mut stuck: Vec<String> = running
            .iter()
            .filter(|(_, done)| !done.is_cancelled())
            .map(|(actor, _)| actor.name().to_owned())
            .collect();
        stuck.sort_unstable();
        tracing::warn!(?grace, ?stuck, "grace period exceeded");
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Waits for a termination signal (or external root cancellation), then shuts down.
    ///
    /// # Errors
    /// [`RuntimeError::Signal`] if signal handlers cannot be installed, otherwise
    /// whatever [`shutdown`](Self::shutdown) returns.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        tokio::select! {
            res = shutdown::wait_for_shutdown_signal() => res?,
            _ = self.root.cancelled() => {}
        }
        self.shutdown().await
    }

    async fn lookup(&self, name: &str) -> Option<Arc<AgentActor>> {
        let actor = self.registry.get(name).await;
        if actor.is_none() {
            tracing::debug!(agent = %name, "unknown agent");
        }
        actor
    }

    async fn stop_actor(&self, actor: &AgentActor) -> Result<(), SupervisorError> {
        let Some(stopping) = actor.begin_stop().await else {
            return Ok(());
        };
        let name = actor.name();
        tracing::info!(agent = %name, "stopping agent");
        if let Some(cancel) = &stopping.cancel {
            cancel.cancel();
        }

        let timeout = self.cfg.stop_timeout;
        let finished = match &stopping.done {
            Some(done) => time::timeout(timeout, done.cancelled()).await.is_ok(),
            None => true,
        };
        actor.finish_stop(stopping.epoch).await;

        if finished {
            Ok(())
        } else {
            tracing::warn!(agent = %name, ?timeout, "agent did not stop in time");
            Err(SupervisorError::StopTimeout {
                name: name.to_owned(),
                timeout,
            })
        }
    }

    async fn drain(&self, actor: &AgentActor) {
        if let Err(err) = self.stop_actor(actor).await {
            tracing::warn!(agent = %actor.name(), error = %err, "replaced agent still running");
        }
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("cfg", &self.cfg)
            .field("shut_down", &self.root.is_cancelled())
            .finish_non_exhaustive()
    }
}
