//! Cached list responses and their invalidation

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use super::weather::cache::FastCache;

/// List scopes sharing one invalidation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    Locations,
    Reviews,
}

impl ListScope {
    pub const ALL: [ListScope; 2] = [ListScope::Locations, ListScope::Reviews];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListScope::Locations => "locations",
            ListScope::Reviews => "reviews",
        }
    }

    /// Glob matching every cached page of this scope
    pub fn pattern(&self) -> String {
        format!("list:{}:*", self.as_str())
    }
}

/// List responses kept in the fast cache under `list:{scope}:{digest}`.
///
/// Caching is an optimisation only: read and write failures are logged and
/// treated as a miss.
#[derive(Clone)]
pub struct ListCache {
    cache: Arc<dyn FastCache>,
    ttl: Duration,
}

impl ListCache {
    pub fn new(cache: Arc<dyn FastCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Key for one list request. `variant` separates responses that differ
    /// for the same query (e.g. staff visibility).
    pub fn key<Q: Serialize>(&self, scope: ListScope, query: &Q, variant: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(query).unwrap_or_default());
        hasher.update(b"|");
        hasher.update(variant.as_bytes());
        format!("list:{}:{}", scope.as_str(), hex::encode(hasher.finalize()))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    tracing::debug!("list cache hit: {}", key);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!("Ignoring undecodable list cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("List cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode list response for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.cache.set(key, &json, self.ttl).await {
            tracing::warn!("List cache write failed for {}: {}", key, e);
        }
    }

    /// Drop every cached location and review list.
    ///
    /// Skipped when the backend cannot delete by pattern; the triggering
    /// write is never failed by invalidation.
    pub async fn invalidate(&self) {
        if !self.cache.supports_pattern_delete() {
            tracing::debug!("Cache backend has no pattern delete, list invalidation skipped");
            return;
        }
        for scope in ListScope::ALL {
            match self.cache.delete_pattern(&scope.pattern()).await {
                Ok(n) => tracing::debug!("Invalidated {} cached {} lists", n, scope.as_str()),
                Err(e) => tracing::warn!("Failed to invalidate {} lists: {}", scope.as_str(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::weather::cache::{MemoryCache, MockFastCache};

    const TTL: Duration = Duration::from_secs(900);

    #[derive(Serialize)]
    struct Query {
        page: i64,
        search: Option<&'static str>,
    }

    #[test]
    fn test_keys_depend_on_query_and_variant() {
        let cache = ListCache::new(Arc::new(MemoryCache::new()), TTL);
        let q1 = Query { page: 1, search: None };
        let q2 = Query { page: 2, search: None };

        let k1 = cache.key(ListScope::Locations, &q1, "public");
        assert!(k1.starts_with("list:locations:"));
        assert_eq!(k1, cache.key(ListScope::Locations, &q1, "public"));
        assert_ne!(k1, cache.key(ListScope::Locations, &q2, "public"));
        assert_ne!(k1, cache.key(ListScope::Locations, &q1, "staff"));
        assert!(cache.key(ListScope::Reviews, &q1, "public").starts_with("list:reviews:"));
    }

    #[tokio::test]
    async fn test_invalidate_drops_both_scopes_only() {
        let memory = MemoryCache::new();
        let cache = ListCache::new(Arc::new(memory.clone()), TTL);
        let q = Query { page: 1, search: Some("park") };
        let loc_key = cache.key(ListScope::Locations, &q, "public");
        let rev_key = cache.key(ListScope::Reviews, &q, "public");
        cache.put(&loc_key, &vec![1, 2, 3]).await;
        cache.put(&rev_key, &vec![4]).await;
        memory.set("weather:1.0000_2.0000", "{}", TTL).await.unwrap();

        assert_eq!(cache.get::<Vec<i32>>(&loc_key).await, Some(vec![1, 2, 3]));
        cache.invalidate().await;

        assert_eq!(cache.get::<Vec<i32>>(&loc_key).await, None);
        assert_eq!(cache.get::<Vec<i32>>(&rev_key).await, None);
        assert!(memory.get("weather:1.0000_2.0000").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_skipped_without_pattern_delete() {
        let mut mock = MockFastCache::new();
        mock.expect_supports_pattern_delete().return_const(false);
        mock.expect_delete_pattern().times(0);
        let cache = ListCache::new(Arc::new(mock), TTL);

        cache.invalidate().await;
    }

    #[tokio::test]
    async fn test_read_failure_is_a_miss() {
        let mut mock = MockFastCache::new();
        mock.expect_get()
            .returning(|_| Err(AppError::Cache("timeout".to_string())));
        let cache = ListCache::new(Arc::new(mock), TTL);

        assert_eq!(cache.get::<Vec<i32>>("list:locations:abc").await, None);
    }
}
