//! Supervisor core: per-agent actors, the name registry and shutdown handling.

mod actor;
mod registry;
mod shutdown;
mod state;
mod supervisor;

pub use state::{AgentStatus, Phase};
pub use supervisor::Supervisor;
