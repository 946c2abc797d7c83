//! Per-database authentication cache.

use std::collections::HashMap;

use {async_trait::async_trait, tokio::sync::RwLock};

/// Numeric user id returned by `common.authenticate`.
pub type Uid = i64;

/// Storage for uids obtained from successful authentications.
///
/// Entries are written once per database and never expire. Two concurrent
/// first authentications for the same database may both `put`; the last
/// write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, database: &str) -> Option<Uid>;
    async fn put(&self, database: &str, uid: Uid);
}

/// Process-lifetime, in-memory [`SessionStore`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Uid>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, database: &str) -> Option<Uid> {
        self.sessions.read().await.get(database).copied()
    }

    async fn put(&self, database: &str, uid: Uid) {
        self.sessions.write().await.insert(database.to_string(), uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_until_put() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.get("acme").await, None);

        store.put("acme", 7).await;
        assert_eq!(store.get("acme").await, Some(7));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn databases_are_isolated() {
        let store = InMemorySessionStore::new();
        store.put("acme", 7).await;
        store.put("globex", 2).await;

        assert_eq!(store.get("acme").await, Some(7));
        assert_eq!(store.get("globex").await, Some(2));
        assert_eq!(store.get("initech").await, None);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemorySessionStore::new();
        store.put("acme", 7).await;
        store.put("acme", 9).await;
        assert_eq!(store.get("acme").await, Some(9));
        assert_eq!(store.len().await, 1);
    }
}
