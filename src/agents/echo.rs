//! # EchoAgent: reference agent
//!
//! Listens on [`EventType::Message`] and answers every human message that is not
//! a slash-command with an assistant message echoing it back. Useful as a smoke
//! test for the bus/supervisor wiring.
//!
//! ```text
//! human: "hello"     ──► [echo] ──► assistant(echo): "Echo Human: hello"
//! human: "/status"   ──► [echo]     (ignored, handled by the host)
//! assistant / system ──► [echo]     (ignored)
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::agents::Agent;
use crate::error::AgentError;
use crate::events::{Bus, EventType};
use crate::message::{Message, Source};

/// Queue size of the echo subscription.
const BUFFER: usize = 64;

/// Agent that echoes human messages.
#[derive(Debug, Clone)]
pub struct EchoAgent {
    bus: Bus,
}

impl EchoAgent {
    pub const NAME: &'static str = "echo";

    #[must_use]
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    fn reply(&self, msg: &Message) -> Option<Message> {
        if msg.source != Source::Human || msg.is_command() {
            return None;
        }
        Some(Message::assistant(
            Self::NAME,
            format!("Echo Human: {}", msg.text),
        ))
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn start(&self, ctx: CancellationToken) -> Result<(), AgentError> {
        let (mut rx, _unsub) = self.bus.subscribe(EventType::Message, BUFFER)?;

        loop {
            tokio::select! {
                _ = ctx.cancelled() => return Err(AgentError::Canceled),
                ev = rx.recv() => {
                    let Some(ev) = ev else { return Ok(()) };
                    let Some(msg) = ev.payload::<Message>() else { continue };
                    if let Some(reply) = self.reply(msg) {
                        self.bus.publish(EventType::Message, reply);
                    }
                }
            }
        }
    }
}
