//! # Events carried by the bus.
//!
//! An [`Event`] is created by [`Bus::publish`](crate::Bus::publish) and never
//! mutated afterwards. The payload is type-erased and shared: every subscriber
//! that receives the event holds the same allocation.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), agentvisor::BusError> {
//! use agentvisor::{Bus, EventType};
//!
//! let bus = Bus::new(8);
//! let (mut rx, _unsub) = bus.subscribe(EventType::System, 0)?;
//! bus.publish(EventType::System, "quit");
//!
//! let ev = rx.recv().await.expect("event");
//! assert_eq!(ev.kind, EventType::System);
//! assert_eq!(ev.payload::<&'static str>(), Some(&"quit"));
//! assert_eq!(ev.payload::<String>(), None);
//! # Ok(())
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Routing key of an event.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Control traffic (quit requests, status notices).
    System,
    /// Conversation traffic between humans and agents.
    Message,
}

impl EventType {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventType::System => "system",
            EventType::Message => "message",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Opaque shared payload.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Immutable event.
///
/// - `seq`: per-bus publish order
/// - `at`: wall-clock time of the publish call
#[derive(Clone)]
pub struct Event {
    /// Monotonic sequence number, unique within one bus.
    pub seq: u64,
    /// Routing key.
    pub kind: EventType,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    payload: Payload,
}

impl Event {
    pub(crate) fn new(seq: u64, kind: EventType, payload: Payload) -> Self {
        Self {
            seq,
            kind,
            at: SystemTime::now(),
            payload,
        }
    }

    /// Borrows the payload as `T`, if that is its concrete type.
    #[inline]
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Returns the shared, type-erased payload.
    #[inline]
    pub fn payload_any(&self) -> &Payload {
        &self.payload
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("kind", &self.kind)
            .field("at", &self.at)
            .finish_non_exhaustive()
    }
}
