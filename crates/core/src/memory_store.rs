//! In-memory [`SessionStore`] used by tests and by the server when no
//! database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::session::{Session, SessionStore, StoreError, StoreResult};

/// Sessions kept in a `HashMap` behind a `RwLock`.
///
/// `revoke` checks and flips the flag under one write lock, which gives the
/// same compare-and-set semantics as the SQL `UPDATE ... WHERE is_revoked =
/// false` used by the durable store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (including revoked and expired ones).
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Snapshot of every stored session, for assertions in tests.
    pub async fn all(&self) -> Vec<Session> {
        self.sessions.read().await.values().cloned().collect()
    }

    /// Replace the stored expiry of a session. Returns `false` if unknown.
    pub async fn set_expires_at(&self, id: &str, expires_at: i64) -> bool {
        match self.sessions.write().await.get_mut(id) {
            Some(session) => {
                session.expires_at = expires_at;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> StoreResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(StoreError::Duplicate(session.id.clone()));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Session> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn revoke(&self, id: &str) -> StoreResult<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) if !session.revoked => {
                session.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    fn session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            refresh_secret_hash: "hash".to_string(),
            bound_address: "172.0.0.1".to_string(),
            revoked: false,
            expires_at: 1_764_743_068,
        }
    }

    #[tokio::test]
    async fn save_then_get_returns_same_session() {
        let store = MemorySessionStore::new();
        store.save(&session("1")).await.unwrap();

        let fetched = store.get("1").await.unwrap();
        assert_eq!(fetched, session("1"));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemorySessionStore::new();
        assert_matches!(store.get("nope").await, Err(StoreError::NotFound(id)) if id == "nope");
    }

    #[tokio::test]
    async fn duplicate_save_is_rejected() {
        let store = MemorySessionStore::new();
        store.save(&session("1")).await.unwrap();
        assert_matches!(
            store.save(&session("1")).await,
            Err(StoreError::Duplicate(_))
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = MemorySessionStore::new();
        store.save(&session("1")).await.unwrap();

        assert!(store.revoke("1").await.unwrap());
        assert!(!store.revoke("1").await.unwrap());
        assert!(store.get("1").await.unwrap().revoked);
    }

    #[tokio::test]
    async fn revoke_unknown_is_noop() {
        let store = MemorySessionStore::new();
        assert!(!store.revoke("ghost").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_revokes_have_one_winner() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&session("1")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.revoke("1").await.unwrap() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
