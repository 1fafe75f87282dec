//! # AgentActor: one supervised registration.
//!
//! Owns the [`RunState`] of a single agent and drives its run-loop:
//!
//! ```text
//! start_agent ──► begin() ──► spawn(run)
//!
//! loop {
//!   ├─► root cancelled?            → Stopped, exit
//!   ├─► agent.start(run_token)
//!   ├─► Err(Canceled) / run cancelled → Stopped, exit
//!   ├─► Err(e) + auto_restart       → restarts += 1, last_error = e
//!   │                                  sleep(backoff.next(restarts - 1)) (cancellable)
//!   └─► otherwise                   → Stopped (+ last_error), exit
//! }
//! ```
//!
//! ## Rules
//! - Runs are **sequential** for one actor; the loop never starts two at once.
//! - Every start bumps the epoch. A loop writes state only while its epoch is
//!   current, so a loop abandoned by a timed-out stop never clobbers a newer run.
//! - The completion signal fires when the loop exits, panics included.
//! - A panicking agent counts as a failed run.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::{select, time};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::agents::AgentSpec;
use crate::core::state::{AgentStatus, Phase, RunState};
use crate::error::AgentError;

/// Everything a freshly armed run-loop needs.
pub(crate) struct Launch {
    epoch: u64,
    token: CancellationToken,
    root: CancellationToken,
    done: DropGuard,
}

/// Handles of a stop in progress.
pub(crate) struct Stopping {
    pub(crate) epoch: u64,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) done: Option<CancellationToken>,
}

/// Supervises one registered agent.
pub(crate) struct AgentActor {
    spec: AgentSpec,
    state: Mutex<RunState>,
}

impl AgentActor {
    pub(crate) fn new(spec: AgentSpec) -> Arc<Self> {
        Arc::new(Self {
            spec,
            state: Mutex::new(RunState::default()),
        })
    }

    pub(crate) fn name(&self) -> &str {
        self.spec.name()
    }

    /// Snapshot taken under the state lock.
    pub(crate) async fn status(&self) -> AgentStatus {
        let st = self.state.lock().await;
        AgentStatus {
            name: self.name().to_owned(),
            phase: st.phase,
            restarts: st.restarts,
            last_error: st.last_error.clone(),
        }
    }

    /// Arms a new run and marks the agent `Running`.
    ///
    /// Returns `None` when the agent is already running or a stop is in flight.
    pub(crate) async fn begin(&self, root: &CancellationToken) -> Option<Launch> {
        let mut st = self.state.lock().await;
        if st.phase == Phase::Running || st.stopping {
            return None;
        }

        let token = root.child_token();
        let done = CancellationToken::new();
        st.epoch += 1;
        st.phase = Phase::Running;
        st.cancel = Some(token.clone());
        st.done = Some(done.clone());

        Some(Launch {
            epoch: st.epoch,
            token,
            root: root.clone(),
            done: done.drop_guard(),
        })
    }

    /// Flags a stop on a running agent and hands out its cancel/done handles.
    pub(crate) async fn begin_stop(&self) -> Option<Stopping> {
        let mut st = self.state.lock().await;
        if st.phase != Phase::Running {
            return None;
        }
        st.stopping = true;
        Some(Stopping {
            epoch: st.epoch,
            cancel: st.cancel.clone(),
            done: st.done.clone(),
        })
    }

    /// Settles a stop. Ignored if another start took over in the meantime.
    pub(crate) async fn finish_stop(&self, epoch: u64) {
        let mut st = self.state.lock().await;
        if st.epoch != epoch {
            return;
        }
        st.phase = Phase::Stopped;
        st.stopping = false;
        st.cancel = None;
        st.done = None;
    }

    /// Completion signal of the current run, if the agent is running.
    pub(crate) async fn running_signal(&self) -> Option<CancellationToken> {
        let st = self.state.lock().await;
        match st.phase {
            Phase::Running => st.done.clone(),
            Phase::Stopped => None,
        }
    }

    /// The supervised run-loop. Spawned once per start.
    pub(crate) async fn run(self: Arc<Self>, launch: Launch) {
        let Launch {
            epoch,
            token,
            root,
            done: _done,
        } = launch;
        let agent = Arc::clone(self.spec.agent());
        let name = self.name();

        loop {
            if root.is_cancelled() {
                self.settle(epoch).await;
                tracing::info!(agent = %name, "agent stopped by shutdown");
                return;
            }

            let res = match AssertUnwindSafe(agent.start(token.clone()))
                .catch_unwind()
                .await
            {
                Ok(res) => res,
                Err(panic) => Err(AgentError::fail(panic_message(panic.as_ref()))),
            };

            let mut st = self.state.lock().await;
            if st.epoch != epoch {
                tracing::debug!(agent = %name, "stale run-loop exiting");
                return;
            }

            match res {
                Err(AgentError::Canceled) => {
                    st.phase = Phase::Stopped;
                    tracing::info!(agent = %name, "agent stopped");
                    return;
                }
                _ if token.is_cancelled() => {
                    st.phase = Phase::Stopped;
                    tracing::info!(agent = %name, "agent stopped");
                    return;
                }
                Err(err) if self.spec.auto_restart() && !st.stopping => {
                    st.restarts += 1;
                    st.last_error = Some(err.clone());
                    let restarts = st.restarts;
                    drop(st);

                    let delay = self.spec.backoff().next(restarts.saturating_sub(1));
                    tracing::error!(
                        agent = %name,
                        error = %err,
                        restarts,
                        backoff = ?delay,
                        "agent failed, restarting"
                    );

                    let sleep = time::sleep(delay);
                    tokio::pin!(sleep);
                    select! {
                        _ = &mut sleep => {}
                        _ = token.cancelled() => {
                            self.settle(epoch).await;
                            tracing::info!(agent = %name, "agent stopped during backoff");
                            return;
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(agent = %name, error = %err, "agent terminated");
                    st.phase = Phase::Stopped;
                    st.last_error = Some(err);
                    return;
                }
                Ok(()) => {
                    st.phase = Phase::Stopped;
                    tracing::info!(agent = %name, "agent finished");
                    return;
                }
            }
        }
    }

    /// Marks the agent `Stopped` if `epoch` is still current.
    async fn settle(&self, epoch: u64) {
        let mut st = self.state.lock().await;
        if st.epoch == epoch {
            st.phase = Phase::Stopped;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        format!("panic: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("panic: {msg}")
    } else {
        "panic: unknown".to_owned()
    }
}
