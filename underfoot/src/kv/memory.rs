//! In-memory key-value store.
//!
//! Backed by a concurrent map, so it is safe to share across async tasks
//! without an outer lock. Used by tests and by callers that want a
//! throwaway store without touching disk.

use dashmap::DashMap;

use super::{BoxFuture, KeyValueStore, KvError};

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, KvError>> {
        let value = self.entries.get(key).map(|v| v.clone());
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), KvError>> {
        self.entries.insert(key.to_string(), value);
        Box::pin(async move { Ok(()) })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, Result<bool, KvError>> {
        let existed = self.entries.remove(key).is_some();
        Box::pin(async move { Ok(existed) })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, KvError>> {
        let keys = self.entries.iter().map(|e| e.key().clone()).collect();
        Box::pin(async move { Ok(keys) })
    }
}
