//! In-memory session store

use super::{key_matches, SessionStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry {
    value: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local [`SessionStore`] backed by a `HashMap`.
///
/// Deadlines use the tokio clock, so TTL behavior is testable with paused
/// time. Reads evict the entry they find expired; the periodic sweep handles
/// the rest. Two concurrent read-modify-write cycles on the same session are
/// last-write-wins.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }

    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    async fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .await
            .remove(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    async fn update(&self, key: &str, value: Value) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
            return false;
        }
        match entries.get_mut(key) {
            Some(entry) => {
                entry.value = value;
                true
            }
            None => false,
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_expired()) {
            entries.remove(key);
            return false;
        }
        entries.contains_key(key)
    }

    async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    async fn list_keys(&self, pattern: &str) -> Vec<String> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        entries
            .keys()
            .filter(|key| key_matches(pattern, key))
            .cloned()
            .collect()
    }
}
