//! services/api/src/adapters/session_store.rs
//!
//! Process-local implementation of the `SessionStore` port. Sessions never
//! expire and are lost on restart.

use alumni_map_core::domain::SessionUser;
use alumni_map_core::ports::{PortResult, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionUser>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, token: &str, user: SessionUser) -> PortResult<()> {
        self.sessions.write().await.insert(token.to_string(), user);
        Ok(())
    }

    async fn get(&self, token: &str) -> PortResult<Option<SessionUser>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> PortResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
