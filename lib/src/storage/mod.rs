// lib/src/storage/mod.rs
//! Durable client-side key/value storage backing the session and drafts.

use async_trait::async_trait;
use models::PortalResult;

pub mod memory_storage;
pub mod sled_storage;

pub use memory_storage::MemoryStorage;
pub use sled_storage::SledStorage;

#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get(&self, key: &str) -> PortalResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> PortalResult<()>;
    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> PortalResult<()>;

    async fn contains(&self, key: &str) -> PortalResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
