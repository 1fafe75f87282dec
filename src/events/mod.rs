//! Event bus: types, subscriptions and the broker itself.
//!
//! ## Contents
//! - [`EventType`], [`Event`] routing key and immutable event
//! - [`Bus`] publish/subscribe broker with drop-oldest backpressure
//! - [`EventStream`], [`Unsubscribe`] the two halves of a subscription
//!
//! The bus knows nothing about agents. Agents hold a clone of the bus and use
//! it to subscribe and publish from inside [`Agent::start`](crate::Agent::start).

mod bus;
mod event;
mod queue;
mod stream;

pub use bus::{Bus, Unsubscribe};
pub use event::{Event, EventType, Payload};
pub use stream::EventStream;
