//! # agentvisor
//!
//! **Agentvisor** pairs an in-process event bus with a supervisor for
//! long-running async workers ("agents").
//!
//! Agents talk to each other only through typed events on the [`Bus`]. The
//! [`Supervisor`] keeps each agent alive, restarts it on failure with capped
//! exponential backoff and reports its health. The two never reference each
//! other: they meet inside agents.
//!
//! ## Architecture
//! ```text
//!            ┌───────────────────────────────────────────────┐
//!            │  Supervisor (root CancellationToken)          │
//!            │  - Registry: name → AgentActor                │
//!            │  - Config: backoff, stop_timeout, grace       │
//!            └──────┬─────────────────┬──────────────────┬───┘
//!                   ▼                 ▼                  ▼
//!            ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//!            │ AgentActor  │   │ AgentActor  │   │ AgentActor  │
//!            │ (run-loop)  │   │ (run-loop)  │   │ (run-loop)  │
//!            └──────┬──────┘   └──────┬──────┘   └──────┬──────┘
//!                   ▼                 ▼                  ▼
//!              agent.start()     agent.start()      agent.start()
//!                   │  publish /      │  subscribe       │
//!                   ▼  subscribe      ▼                  ▼
//!            ┌───────────────────────────────────────────────┐
//!            │  Bus: EventType → bounded per-subscriber      │
//!            │  queues (drop-oldest when full)               │
//!            └───────────────────────────────────────────────┘
//! ```
//!
//! ### Run-loop
//! ```text
//! loop {
//!   ├─► root cancelled ─────────────────► Stopped, exit
//!   ├─► agent.start(run_token)
//!   │     ├─ Err(Canceled) / cancelled ─► Stopped, exit
//!   │     ├─ Err(e), auto_restart ──────► restarts += 1, last_error = e,
//!   │     │                               sleep(min · 2^(restarts-1) ≤ max), continue
//!   │     ├─ Err(e) ────────────────────► Stopped, last_error = e, exit
//!   │     └─ Ok(()) ────────────────────► Stopped, exit
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types                                   |
//! |-----------------|----------------------------------------------------------|---------------------------------------------|
//! | **Bus**         | Publish/subscribe by event type, drop-oldest queues.     | [`Bus`], [`EventStream`], [`Unsubscribe`]   |
//! | **Agents**      | Define workers as trait impls or closures.               | [`Agent`], [`AgentFn`], [`AgentSpec`]       |
//! | **Supervision** | Start, stop, restart and inspect agents.                 | [`Supervisor`], [`AgentStatus`]             |
//! | **Policies**    | Restart backoff with optional jitter.                    | [`BackoffPolicy`], [`JitterPolicy`]         |
//! | **Errors**      | Typed errors per concern.                                | [`AgentError`], [`SupervisorError`], ...    |
//! | **Config**      | Central settings.                                        | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use agentvisor::{Bus, Config, EchoAgent, EventType, Message, Source, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let bus = Bus::from_config(&cfg);
//!     let sup = Supervisor::new(cfg, CancellationToken::new());
//!
//!     let (mut replies, _unsub) = bus.subscribe(EventType::Message, 0)?;
//!     sup.register(Arc::new(EchoAgent::new(bus.clone())), true).await;
//!     sup.start_all().await;
//!
//!     // Wait for the echo agent to subscribe.
//!     while bus.len(EventType::Message) < 2 {
//!         tokio::task::yield_now().await;
//!     }
//!     bus.publish(EventType::Message, Message::human("hello"));
//!
//!     while let Some(ev) = tokio::time::timeout(Duration::from_secs(1), replies.recv()).await? {
//!         let Some(msg) = ev.payload::<Message>() else { continue };
//!         if msg.source == Source::Assistant {
//!             assert_eq!(msg.text, "Echo Human: hello");
//!             break;
//!         }
//!     }
//!
//!     sup.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod agents;
mod config;
mod core;
mod error;
mod events;
mod message;
mod policies;

// ---- Public re-exports ----

pub use agents::{Agent, AgentFn, AgentRef, AgentSpec, EchoAgent};
pub use config::Config;
pub use core::{AgentStatus, Phase, Supervisor};
pub use error::{AgentError, BusError, RuntimeError, SupervisorError};
pub use events::{Bus, Event, EventStream, EventType, Payload, Unsubscribe};
pub use message::{Message, Source};
pub use policies::{BackoffPolicy, JitterPolicy};
