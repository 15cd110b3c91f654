// caching/src/caching.rs
//! Best-effort read-through cache shared by the portal services.
//!
//! Each service owns one `Cache` for its domain. Entries are JSON values so a
//! single cache can hold lists and single records alike; any mutating call on
//! the domain drops the whole cache.

use std::time::Duration;
use anyhow::Result;
use moka::future::Cache as MokaCache;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_CAPACITY: u64 = 256;

#[derive(Clone)]
pub struct Cache {
    domain: String,
    inner: MokaCache<String, serde_json::Value>,
}

impl Cache {
    pub fn new(capacity: u64) -> Self {
        Cache::for_domain("default", capacity, None)
    }

    pub fn for_domain(domain: impl Into<String>, capacity: u64, ttl: Option<Duration>) -> Self {
        let mut builder = MokaCache::builder().max_capacity(capacity);
        if let Some(ttl) = ttl {
            builder = builder.time_to_live(ttl);
        }
        Cache {
            domain: domain.into(),
            inner: builder.build(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: serde_json::Value) -> Result<()> {
        self.inner.insert(key, value).await;
        Ok(())
    }

    /// A cached value that no longer decodes is treated as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        serde_json::from_value(value).ok()
    }

    pub async fn insert_as<T: Serialize>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let json = serde_json::to_value(value)?;
        self.insert(key.into(), json).await
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
