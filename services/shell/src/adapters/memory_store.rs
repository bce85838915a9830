//! services/shell/src/adapters/memory_store.rs
//!
//! An in-process `LocalStorage`, used by tests and by runs that should leave nothing on disk.

use async_trait::async_trait;
use growify_core::ports::{LocalStorage, PortResult};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-filled with `items`, as if a previous session had written them.
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            items: Mutex::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.items.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl LocalStorage for MemoryStore {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> PortResult<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}
