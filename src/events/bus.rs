//! # In-memory publish/subscribe bus keyed by [`EventType`].
//!
//! [`Bus`] routes each published event to every subscription registered for its
//! type at the moment of the call. Each subscription owns a bounded queue; a
//! full queue evicts its oldest event, so a slow consumer loses old events but
//! never slows the publisher or any other subscriber.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                       Subscriptions (many, per type):
//!   agent A ──┐                        ┌──► [queue S1] ──► EventStream S1
//!   agent B ──┼──► Bus.publish(kind) ──┼──► [queue S2] ──► EventStream S2
//!   host    ──┘    (snapshot under     └──► [queue SN] ──► EventStream SN
//!                   read lock, send         (bounded, drop-oldest)
//!                   outside it)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: the only wait is one short lock per target queue.
//! - **No replay**: a subscription never sees events published before it existed.
//! - **Per-subscriber FIFO**: delivered events keep publish order; evictions
//!   always take the oldest pending event.
//! - **Weak registry**: the bus holds `Weak` queue references and never keeps a
//!   dropped [`EventStream`] alive.
//! - **Close**: idempotent; rejects later subscriptions, turns publishes into
//!   no-ops and fires every subscription's close signal.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio_util::sync::CancellationToken;

use super::event::{Event, EventType, Payload};
use super::queue::{Delivery, Queue};
use super::stream::EventStream;
use crate::config::Config;
use crate::error::BusError;

/// Registry entry; does not own the queue.
struct Entry {
    queue: Weak<Queue>,
    close: CancellationToken,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.queue.strong_count() > 0
    }
}

#[derive(Default)]
struct Registry {
    closed: bool,
    next_id: u64,
    subs: HashMap<EventType, HashMap<u64, Entry>>,
}

struct Inner {
    registry: RwLock<Registry>,
    default_buffer: usize,
    seq: AtomicU64,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Multi-producer, multi-consumer event bus.
///
/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl Bus {
    /// Creates a bus whose subscriptions default to `default_buffer` queued events.
    ///
    /// The default is clamped to at least 1.
    pub fn new(default_buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::default()),
                default_buffer: default_buffer.max(1),
                seq: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a bus using [`Config::bus_buffer`] as the default queue size.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.bus_buffer_clamped())
    }

    /// Publishes `payload` to every current subscription for `kind`.
    ///
    /// Silently does nothing once the bus is closed.
    pub fn publish<T>(&self, kind: EventType, payload: T)
    where
        T: Any + Send + Sync,
    {
        let _ = self.publish_shared(kind, Arc::new(payload));
    }

    /// Like [`publish`](Self::publish), but reports the outcome.
    ///
    /// Returns the number of subscriptions the event was handed to, or
    /// [`BusError::Closed`].
    pub fn try_publish<T>(&self, kind: EventType, payload: T) -> Result<usize, BusError>
    where
        T: Any + Send + Sync,
    {
        self.publish_shared(kind, Arc::new(payload))
    }

    /// Publishes an already shared payload (e.g. one taken from another event).
    pub fn publish_shared(&self, kind: EventType, payload: Payload) -> Result<usize, BusError> {
        let targets: Vec<Arc<Queue>> = {
            let reg = self.inner.read();
            if reg.closed {
                return Err(BusError::Closed);
            }
            reg.subs
                .get(&kind)
                .map(|subs| subs.values().filter_map(|e| e.queue.upgrade()).collect())
                .unwrap_or_default()
        };

        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        let ev = Event::new(seq, kind, payload);

        for queue in &targets {
            if queue.push(ev.clone()) == Delivery::Evicted {
                tracing::trace!(kind = %kind, seq, "subscriber queue full; evicted oldest event");
            }
        }
        Ok(targets.len())
    }

    /// Registers a new subscription for `kind`.
    ///
    /// `buffer == 0` selects the bus default. Keep the returned [`Unsubscribe`]
    /// alive for as long as events should arrive: dropping it unsubscribes.
    pub fn subscribe(
        &self,
        kind: EventType,
        buffer: usize,
    ) -> Result<(EventStream, Unsubscribe), BusError> {
        let capacity = if buffer == 0 {
            self.inner.default_buffer
        } else {
            buffer
        };

        let queue = Arc::new(Queue::new(capacity));
        let close = CancellationToken::new();

        let mut reg = self.inner.write();
        if reg.closed {
            return Err(BusError::Closed);
        }
        let id = reg.next_id;
        reg.next_id += 1;
        reg.subs.entry(kind).or_default().insert(
            id,
            Entry {
                queue: Arc::downgrade(&queue),
                close: close.clone(),
            },
        );
        drop(reg);

        let stream = EventStream::new(id, kind, queue, close.clone());
        let unsub = Unsubscribe {
            bus: Arc::downgrade(&self.inner),
            kind,
            id,
            close,
            done: AtomicBool::new(false),
        };
        Ok((stream, unsub))
    }

    /// Number of live subscriptions for `kind`.
    ///
    /// Introspection only; the value may be stale by the time it is read.
    pub fn len(&self, kind: EventType) -> usize {
        self.inner
            .read()
            .subs
            .get(&kind)
            .map(|subs| subs.values().filter(|e| e.is_live()).count())
            .unwrap_or(0)
    }

    /// True if `kind` has no live subscriptions.
    pub fn is_empty(&self, kind: EventType) -> bool {
        self.len(kind) == 0
    }

    /// Closes the bus. Idempotent.
    ///
    /// Queued events are left in place; see [`EventStream`] for how consumers
    /// observe the close.
    pub fn close(&self) {
        let subs = {
            let mut reg = self.inner.write();
            if reg.closed {
                return;
            }
            reg.closed = true;
            std::mem::take(&mut reg.subs)
        };

        let count: usize = subs.values().map(HashMap::len).sum();
        for entry in subs.into_values().flat_map(HashMap::into_values) {
            entry.close.cancel();
        }
        tracing::debug!(subscriptions = count, "bus closed");
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reg = self.inner.read();
        f.debug_struct("Bus")
            .field("closed", &reg.closed)
            .field("types", &reg.subs.len())
            .field("default_buffer", &self.inner.default_buffer)
            .finish()
    }
}

/// Guard that removes one subscription from its bus.
///
/// Calling [`unsubscribe`](Self::unsubscribe) more than once is harmless, and
/// dropping the guard unsubscribes as well. Either way the stream's close
/// signal fires.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Unsubscribe {
    bus: Weak<Inner>,
    kind: EventType,
    id: u64,
    close: CancellationToken,
    done: AtomicBool,
}

impl Unsubscribe {
    /// Removes the subscription and fires its close signal.
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.bus.upgrade() {
            let mut reg = inner.write();
            if let Some(subs) = reg.subs.get_mut(&self.kind) {
                subs.remove(&self.id);
                if subs.is_empty() {
                    reg.subs.remove(&self.kind);
                }
            }
        }
        self.close.cancel();
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("done", &self.done.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn seqs(rx: &mut EventStream) -> Vec<u32> {
        std::iter::from_fn(|| rx.try_recv())
            .map(|ev| *ev.payload::<u32>().expect("u32 payload"))
            .collect()
    }

    #[tokio::test]
    async fn delivers_in_publish_order() {
        let bus = Bus::new(64);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 128).unwrap();

        for i in 0..100u32 {
            bus.publish(EventType::Message, i);
        }
        for i in 0..100u32 {
            let ev = rx.recv().await.unwrap();
            assert_eq!(ev.payload::<u32>(), Some(&i));
            assert_eq!(ev.kind, EventType::Message);
        }
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn slow_subscriber_keeps_most_recent() {
        let bus = Bus::new(64);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 4).unwrap();

        for i in 0..10u32 {
            bus.publish(EventType::Message, i);
        }
        assert_eq!(seqs(&mut rx), vec![6, 7, 8, 9]);
        assert_eq!(rx.dropped(), 6);
    }

    #[tokio::test]
    async fn subscribers_are_independent() {
        let bus = Bus::new(64);
        let (mut small, _u1) = bus.subscribe(EventType::Message, 2).unwrap();
        let (mut large, _u2) = bus.subscribe(EventType::Message, 32).unwrap();

        for i in 0..10u32 {
            bus.publish(EventType::Message, i);
        }
        assert_eq!(seqs(&mut large), (0..10).collect::<Vec<_>>());
        assert_eq!(seqs(&mut small), vec![8, 9]);
        assert_eq!(large.dropped(), 0);
    }

    #[tokio::test]
    async fn routes_by_event_type() {
        let bus = Bus::new(8);
        let (mut sys, _u1) = bus.subscribe(EventType::System, 0).unwrap();
        let (mut msg, _u2) = bus.subscribe(EventType::Message, 0).unwrap();

        assert_eq!(bus.try_publish(EventType::System, 1u32), Ok(1));
        assert_eq!(seqs(&mut sys), vec![1]);
        assert!(msg.try_recv().is_none());
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = Bus::new(8);
        bus.publish(EventType::Message, 1u32);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        bus.publish(EventType::Message, 2u32);
        assert_eq!(seqs(&mut rx), vec![2]);
    }

    #[tokio::test]
    async fn zero_buffer_uses_default() {
        let bus = Bus::new(16);
        let (rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        assert_eq!(rx.capacity(), 16);
        assert_eq!(Bus::default().subscribe(EventType::System, 0).unwrap().0.capacity(), 64);
    }

    #[tokio::test]
    async fn closed_bus_rejects_subscribe_and_drops_publish() {
        let bus = Bus::new(8);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        bus.close();
        bus.close();

        assert!(bus.is_closed());
        assert_eq!(
            bus.subscribe(EventType::Message, 0).unwrap_err(),
            BusError::Closed
        );
        assert_eq!(
            bus.try_publish(EventType::Message, 1u32),
            Err(BusError::Closed)
        );
        bus.publish(EventType::Message, 2u32);
        assert!(rx.try_recv().is_none());
        assert_eq!(bus.len(EventType::Message), 0);
    }

    #[tokio::test]
    async fn close_signals_streams_but_keeps_queued_events() {
        let bus = Bus::new(8);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        bus.publish(EventType::Message, 7u32);
        bus.close();

        tokio::time::timeout(Duration::from_secs(1), rx.closed())
            .await
            .expect("close signal");
        assert!(rx.is_closed());
        assert_eq!(rx.recv().await.and_then(|e| e.payload::<u32>().copied()), Some(7));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_wakes_on_publish() {
        let bus = Bus::new(8);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        let publisher = bus.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            publisher.publish(EventType::Message, 42u32);
        });

        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("woken")
            .expect("event");
        assert_eq!(ev.payload::<u32>(), Some(&42));
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent_and_closes_stream() {
        let bus = Bus::new(8);
        let (rx, unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        let (_rx2, _unsub2) = bus.subscribe(EventType::Message, 0).unwrap();
        assert_eq!(bus.len(EventType::Message), 2);

        unsub.unsubscribe();
        unsub.unsubscribe();
        assert_eq!(bus.len(EventType::Message), 1);
        assert!(rx.is_closed());

        drop(unsub);
        assert_eq!(bus.len(EventType::Message), 1);
    }

    #[tokio::test]
    async fn dropping_guard_unsubscribes() {
        let bus = Bus::new(8);
        {
            let (_rx, _unsub) = bus.subscribe(EventType::System, 0).unwrap();
            assert_eq!(bus.len(EventType::System), 1);
        }
        assert_eq!(bus.len(EventType::System), 0);
        assert_eq!(bus.try_publish(EventType::System, ()), Ok(0));
    }

    #[tokio::test]
    async fn dropped_stream_is_not_counted_or_kept_alive() {
        let bus = Bus::new(8);
        let (rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        drop(rx);
        assert_eq!(bus.len(EventType::Message), 0);
        assert_eq!(bus.try_publish(EventType::Message, 1u32), Ok(0));
    }

    #[tokio::test]
    async fn into_stream_ends_after_close() {
        use futures::StreamExt;

        let bus = Bus::new(8);
        let (rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        bus.publish(EventType::Message, 1u32);
        bus.publish(EventType::Message, 2u32);
        bus.close();

        let got: Vec<u32> = rx
            .into_stream()
            .map(|ev| *ev.payload::<u32>().unwrap())
            .collect()
            .await;
        assert_eq!(got, vec![1, 2]);
    }

    #[tokio::test]
    async fn huge_buffer_subscribes_without_preallocating() {
        let bus = Bus::new(8);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, usize::MAX).unwrap();
        assert_eq!(rx.capacity(), usize::MAX);

        for i in 0..100u32 {
            bus.publish(EventType::Message, i);
        }
        assert_eq!(rx.len(), 100);
        assert_eq!(rx.dropped(), 0);
        assert_eq!(seqs(&mut rx), (0..100u32).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn forwarded_payload_is_shared_not_copied() {
        let bus = Bus::new(8);
        let (mut sys, _u1) = bus.subscribe(EventType::System, 0).unwrap();
        let (mut a, _u2) = bus.subscribe(EventType::Message, 0).unwrap();
        let (mut b, _u3) = bus.subscribe(EventType::Message, 0).unwrap();

        bus.publish(EventType::System, String::from("relay me"));
        let original = sys.recv().await.unwrap();
        let reached = bus
            .publish_shared(EventType::Message, Arc::clone(original.payload_any()))
            .unwrap();
        assert_eq!(reached, 2);

        let ea = a.recv().await.unwrap();
        let eb = b.recv().await.unwrap();
        assert_eq!(ea.kind, EventType::Message);
        assert_eq!(ea.payload::<String>().map(String::as_str), Some("relay me"));
        assert!(std::ptr::eq(
            ea.payload::<String>().unwrap(),
            eb.payload::<String>().unwrap()
        ));
        assert!(std::ptr::eq(
            ea.payload::<String>().unwrap(),
            original.payload::<String>().unwrap()
        ));
        assert!(ea.seq > original.seq);
    }

    #[tokio::test]
    async fn sequence_numbers_increase() {
        let bus = Bus::new(8);
        let (mut rx, _unsub) = bus.subscribe(EventType::Message, 0).unwrap();
        bus.publish(EventType::Message, ());
        bus.publish(EventType::Message, ());
        let a = rx.recv().await.unwrap();
        let b = rx.recv().await.unwrap();
        assert!(b.seq > a.seq);
    }
}
