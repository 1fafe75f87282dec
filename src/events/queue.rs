//! Bounded per-subscription FIFO with drop-oldest overflow.
//!
//! The publisher side never waits for the consumer: [`Queue::push`] takes the
//! buffer lock for one `pop_front`/`push_back` pair and returns. The consumer
//! side is woken through a [`Notify`] permit, which is enough because every
//! queue has exactly one consumer (its [`EventStream`](super::EventStream)).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

use super::event::Event;

/// Upper bound on what a new queue preallocates; larger buffers grow on demand.
const PREALLOC: usize = 64;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// Enqueued with room to spare.
    Queued,
    /// Enqueued after evicting the oldest pending event.
    Evicted,
}

pub(crate) struct Queue {
    buf: Mutex<VecDeque<Event>>,
    capacity: usize,
    ready: Notify,
    dropped: AtomicU64,
}

impl Queue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Mutex::new(VecDeque::with_capacity(capacity.min(PREALLOC))),
            capacity,
            ready: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn push(&self, ev: Event) -> Delivery {
        let outcome = {
            let mut buf = self.lock();
            let outcome = if buf.len() >= self.capacity {
                buf.pop_front();
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Delivery::Evicted
            } else {
                Delivery::Queued
            };
            buf.push_back(ev);
            outcome
        };
        self.ready.notify_one();
        outcome
    }

    pub(crate) fn pop(&self) -> Option<Event> {
        self.lock().pop_front()
    }

    pub(crate) async fn ready(&self) {
        self.ready.notified().await
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use std::sync::Arc;

    fn ev(seq: u64) -> Event {
        Event::new(seq, EventType::Message, Arc::new(seq))
    }

    #[test]
    fn full_queue_evicts_oldest() {
        let q = Queue::new(2);
        assert_eq!(q.push(ev(1)), Delivery::Queued);
        assert_eq!(q.push(ev(2)), Delivery::Queued);
        assert_eq!(q.push(ev(3)), Delivery::Evicted);

        assert_eq!(q.len(), 2);
        assert_eq!(q.dropped(), 1);
        assert_eq!(q.pop().map(|e| e.seq), Some(2));
        assert_eq!(q.pop().map(|e| e.seq), Some(3));
        assert!(q.pop().is_none());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let q = Queue::new(0);
        assert_eq!(q.capacity(), 1);
        q.push(ev(1));
        q.push(ev(2));
        assert_eq!(q.pop().map(|e| e.seq), Some(2));
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let q = Queue::new(usize::MAX);
        assert_eq!(q.capacity(), usize::MAX);
        for seq in 0..200 {
            assert_eq!(q.push(ev(seq)), Delivery::Queued);
        }
        assert_eq!(q.len(), 200);
        assert_eq!(q.dropped(), 0);
        assert_eq!(q.pop().map(|e| e.seq), Some(0));
    }
}
