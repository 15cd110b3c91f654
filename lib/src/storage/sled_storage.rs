// lib/src/storage/sled_storage.rs
use std::path::Path;
use async_trait::async_trait;
use log::{debug, info};
use models::{PortalError, PortalResult};
use super::DurableStorage;

/// Sled-backed storage so a session survives restarts of the CLI.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let path = path.as_ref();
        info!("Opening client storage at {:?}", path);
        let db = sled::open(path)?;
        Ok(SledStorage { db })
    }
}

#[async_trait]
impl DurableStorage for SledStorage {
    async fn get(&self, key: &str) -> PortalResult<Option<String>> {
        match self.db.get(key.as_bytes())? {
            Some(raw) => String::from_utf8(raw.to_vec())
                .map(Some)
                .map_err(|e| PortalError::Deserialization(format!("Stored value for '{}' is not UTF-8: {}", key, e))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> PortalResult<()> {
        self.db.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush_async().await?;
        debug!("Persisted key '{}'", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortalResult<()> {
        self.db.remove(key.as_bytes())?;
        self.db.flush_async().await?;
        Ok(())
    }
}
