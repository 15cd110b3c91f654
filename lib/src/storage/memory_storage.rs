// lib/src/storage/memory_storage.rs
use std::collections::HashMap;
use async_trait::async_trait;
use models::PortalResult;
use tokio::sync::Mutex as TokioMutex;
use super::DurableStorage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    kv_store: TokioMutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        MemoryStorage {
            kv_store: TokioMutex::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.kv_store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.kv_store.lock().await.is_empty()
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get(&self, key: &str) -> PortalResult<Option<String>> {
        Ok(self.kv_store.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortalResult<()> {
        self.kv_store.lock().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortalResult<()> {
        self.kv_store.lock().await.remove(key);
        Ok(())
    }
}
