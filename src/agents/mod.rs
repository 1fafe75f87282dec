//! # Agent abstractions.
//!
//! - [`Agent`] - trait implemented by every supervised worker
//! - [`AgentFn`] - closure-backed implementation
//! - [`AgentRef`] - shared handle (`Arc<dyn Agent>`)
//! - [`AgentSpec`] - agent plus restart policy
//! - [`EchoAgent`] - reference agent built on the bus

mod agent;
mod agent_fn;
mod echo;
mod spec;

pub use agent::{Agent, AgentRef};
pub use agent_fn::AgentFn;
pub use echo::EchoAgent;
pub use spec::AgentSpec;
