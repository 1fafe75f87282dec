//! # Agent registry: name → [`AgentActor`].
//!
//! The registry lock only guards the name map. Callers clone the `Arc` out and
//! release the lock before touching an actor's own state lock, so the two
//! locks are never held together.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::actor::AgentActor;

#[derive(Default)]
pub(crate) struct Registry {
    agents: RwLock<HashMap<String, Arc<AgentActor>>>,
}

impl Registry {
    /// Installs `actor` under its name, returning the one it displaced.
    pub(crate) async fn insert(&self, actor: Arc<AgentActor>) -> Option<Arc<AgentActor>> {
        let name = actor.name().to_owned();
        self.agents.write().await.insert(name, actor)
    }

    pub(crate) async fn get(&self, name: &str) -> Option<Arc<AgentActor>> {
        self.agents.read().await.get(name).cloned()
    }

    /// Sorted snapshot of registered names.
    pub(crate) async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub(crate) async fn snapshot(&self) -> Vec<Arc<AgentActor>> {
        self.agents.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentFn, AgentSpec};
    use crate::error::AgentError;
    use tokio_util::sync::CancellationToken;

    fn actor(name: &'static str) -> Arc<AgentActor> {
        let agent = AgentFn::arc(name, |_ctx: CancellationToken| async {
            Ok::<(), AgentError>(())
        });
        AgentActor::new(AgentSpec::new(agent, false))
    }

    #[tokio::test]
    async fn insert_replaces_and_returns_previous() {
        let reg = Registry::default();
        assert!(reg.insert(actor("b")).await.is_none());
        assert!(reg.insert(actor("a")).await.is_none());
        let first = reg.get("a").await.unwrap();

        let displaced = reg.insert(actor("a")).await.unwrap();
        assert!(Arc::ptr_eq(&displaced, &first));
        assert!(!Arc::ptr_eq(&reg.get("a").await.unwrap(), &first));
        assert_eq!(reg.names().await, vec!["a", "b"]);
        assert_eq!(reg.snapshot().await.len(), 2);
        assert!(reg.get("ghost").await.is_none());
    }
}
