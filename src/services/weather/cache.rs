//! Cache-tier interfaces shared by the weather pipeline and list caching.
//!
//! The fast tier is a key-value store with per-key expiry (Redis in
//! production). The durable tier is an object store with no expiry of its
//! own; callers judge freshness from the last-write timestamp.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AppResult;

/// Low-latency key-value cache with expiry.
///
/// `get` returns `Ok(None)` on a miss; `Err` is reserved for I/O failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FastCache: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Whether `delete_pattern` is implemented by this backend
    fn supports_pattern_delete(&self) -> bool;

    /// Delete every key matching a glob pattern such as `list:locations:*`.
    /// Returns the number of deleted keys.
    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64>;
}

/// Object read back from the durable tier
#[derive(Debug, Clone, PartialEq)]
pub struct DurableEntry {
    pub body: Vec<u8>,
    pub last_modified: DateTime<Utc>,
}

/// Object store used as a long-lived cache.
///
/// A missing object is `Ok(None)`; any other failure is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DurableCache: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<DurableEntry>>;

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> AppResult<()>;
}

/// Process-local fast cache, used for development and tests
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }
}

/// Pattern match for invalidation: a trailing `*` matches any suffix,
/// otherwise the key must match exactly
fn pattern_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl FastCache for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it so the map does not grow unbounded
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    fn supports_pattern_delete(&self) -> bool {
        true
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !pattern_matches(pattern, key));
        Ok((before - entries.len()) as u64)
    }
}

/// Process-local object store, used for development and tests
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, DurableEntry>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with an explicit last-write time
    pub async fn put_at(&self, key: &str, body: Vec<u8>, last_modified: DateTime<Utc>) {
        self.objects
            .write()
            .await
            .insert(key.to_string(), DurableEntry { body, last_modified });
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }
}

#[async_trait]
impl DurableCache for MemoryObjectStore {
    async fn get(&self, key: &str) -> AppResult<Option<DurableEntry>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> AppResult<()> {
        self.put_at(key, body, Utc::now()).await;
        Ok(())
    }
}
