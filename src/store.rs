//! Session store
//!
//! Maps channel ids to their combat sessions. Each session sits behind its
//! own mutex: updates to one channel are serialized, while different channels
//! proceed independently.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::combat::CombatSession;
use crate::ChannelId;

/// A session shared between tasks
pub type SharedSession = Arc<Mutex<CombatSession>>;

/// All live combat sessions
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChannelId, SharedSession>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shared instance
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get the channel's session, creating it on first use
    pub async fn session(&self, channel: &ChannelId) -> SharedSession {
        if let Some(session) = self.sessions.read().await.get(channel) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(channel.clone())
            .or_insert_with(|| {
                debug!(%channel, "Creating combat session");
                Arc::new(Mutex::new(CombatSession::new(channel.clone())))
            })
            .clone()
    }

    /// Get the channel's session if one exists
    pub async fn get(&self, channel: &ChannelId) -> Option<SharedSession> {
        self.sessions.read().await.get(channel).cloned()
    }

    /// Remove the channel's session
    pub async fn remove(&self, channel: &ChannelId) -> Option<SharedSession> {
        self.sessions.write().await.remove(channel)
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of sessions with combat in progress
    pub async fn active_count(&self) -> usize {
        let sessions: Vec<SharedSession> = self.sessions.read().await.values().cloned().collect();
        let mut active = 0;
        for session in sessions {
            if session.lock().await.is_active() {
                active += 1;
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_created_once() {
        let store = SessionStore::new();
        let channel = ChannelId::from("table");

        let first = store.session(&channel).await;
        let second = store.session(&channel).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_does_not_create() {
        let store = SessionStore::new();
        assert!(store.get(&ChannelId::from("nowhere")).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_remove_and_active_count() {
        let store = SessionStore::new();
        let a = ChannelId::from("a");
        let b = ChannelId::from("b");

        store
            .session(&a)
            .await
            .lock()
            .await
            .add_player("p1", "Thoradin", 15)
            .unwrap();
        store.session(&b).await;
        assert_eq!(store.active_count().await, 1);

        assert!(store.remove(&a).await.is_some());
        assert!(store.remove(&a).await.is_none());
        assert!(store.get(&b).await.is_some());
        assert_eq!(store.len().await, 1);
        assert_eq!(store.active_count().await, 0);
    }
}
