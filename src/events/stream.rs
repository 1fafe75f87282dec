//! # Receive side of a subscription.
//!
//! [`EventStream`] owns the subscription's bounded queue. The bus keeps only a
//! weak reference to it, so dropping the stream is enough to stop deliveries,
//! while the [`Unsubscribe`](super::Unsubscribe) guard removes the registration.
//!
//! ## Close semantics
//! The close signal fires when the subscription is unsubscribed or the bus is
//! closed. Events already queued stay readable: [`EventStream::recv`] keeps
//! returning them and yields `None` only once the signal has fired and the
//! queue is empty. Consumers that prefer to stop immediately select on
//! [`EventStream::closed`] instead.

use std::sync::Arc;

use futures::Stream;
use tokio_util::sync::CancellationToken;

use super::event::{Event, EventType};
use super::queue::Queue;

/// Receive-only handle to one subscription.
pub struct EventStream {
    id: u64,
    kind: EventType,
    queue: Arc<Queue>,
    close: CancellationToken,
}

impl EventStream {
    pub(crate) fn new(
        id: u64,
        kind: EventType,
        queue: Arc<Queue>,
        close: CancellationToken,
    ) -> Self {
        Self {
            id,
            kind,
            queue,
            close,
        }
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the subscription is closed and drained.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            if let Some(ev) = self.queue.pop() {
                return Some(ev);
            }
            if self.close.is_cancelled() {
                return None;
            }
            tokio::select! {
                _ = self.queue.ready() => {}
                _ = self.close.cancelled() => {}
            }
        }
    }

    /// Takes the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Event> {
        self.queue.pop()
    }

    /// Completes when the close signal fires (unsubscribe or bus close).
    pub async fn closed(&self) {
        self.close.cancelled().await
    }

    /// True once the close signal has fired.
    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled()
    }

    /// Number of events waiting to be received.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if no events are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue capacity chosen at subscribe time.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of events evicted from this subscription because its queue was full.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Event type this subscription was registered for.
    pub fn kind(&self) -> EventType {
        self.kind
    }

    /// Subscription id, unique within its bus.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Adapts the subscription into a [`Stream`] that ends when [`recv`](Self::recv)
    /// would return `None`.
    pub fn into_stream(self) -> impl Stream<Item = Event> + Send + 'static {
        futures::stream::unfold(self, |mut rx| async move {
            let ev = rx.recv().await?;
            Some((ev, rx))
        })
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("closed", &self.is_closed())
            .finish()
    }
}
