//! # Example: echo
//!
//! Wires an [`EchoAgent`] and a flaky worker under one [`Supervisor`].
//!
//! Demonstrates how to:
//! - Share a [`Bus`] between the host and agents.
//! - Register agents, start them, and read their status.
//! - Watch a failing agent restart with exponential backoff.
//! - Shut everything down within a grace period.
//!
//! ## Flow
//! ```text
//! host ──publish(Message::human)──► Bus ──► [echo] ──publish(assistant)──► Bus ──► host
//! [flaky] fails twice ──► restarts after 100ms, 200ms ──► runs until shutdown
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=agentvisor=debug cargo run --example echo
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use agentvisor::{
    AgentError, AgentFn, AgentRef, Bus, Config, EchoAgent, EventType, Message, Source, Supervisor,
};

/// Worker that fails `failures` times before settling down.
fn flaky(failures: u32) -> AgentRef {
    let attempts = Arc::new(AtomicU32::new(0));
    AgentFn::arc("flaky", move |ctx: CancellationToken| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if attempt <= failures {
                return Err(AgentError::fail(format!("attempt {attempt} failed")));
            }
            ctx.cancelled().await;
            Err::<(), _>(AgentError::Canceled)
        }
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = Config::default();
    let bus = Bus::from_config(&cfg);
    let sup = Supervisor::new(cfg, CancellationToken::new());

    sup.register(Arc::new(EchoAgent::new(bus.clone())), true).await;
    sup.register(flaky(2), true).await;

    let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0)?;
    sup.start_all().await;
    while bus.len(EventType::Message) < 2 {
        tokio::task::yield_now().await;
    }

    for text in ["hello", "/status", "how are you?"] {
        println!("[human] {text}");
        bus.publish(EventType::Message, Message::human(text));
    }

    // Two echoes are expected; the command is left to the host.
    let mut echoed = 0;
    while echoed < 2 {
        let Some(ev) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await? else {
            break;
        };
        if let Some(msg) = ev.payload::<Message>()
            && msg.source == Source::Assistant
        {
            println!("[{}] {}", msg.from, msg.text);
            echoed += 1;
        }
    }

    // Let the flaky agent go through its backoff.
    tokio::time::sleep(Duration::from_millis(500)).await;
    for status in sup.list_agents().await {
        println!("{status}");
    }

    sup.shutdown().await?;
    bus.close();
    println!("bye");
    Ok(())
}
