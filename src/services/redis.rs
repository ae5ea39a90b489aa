//! Redis-backed fast cache

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use super::weather::cache::FastCache;
use crate::error::{AppError, AppResult};

/// Keys deleted per DEL round trip during pattern invalidation
const DELETE_BATCH: usize = 500;

/// Fast cache over one shared, auto-reconnecting Redis connection.
///
/// Clones share the connection; commands are pipelined over it.
#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        let service = Self { manager };
        service.ping().await?;
        Ok(service)
    }

    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Cache(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }

    /// Handle on the shared connection
    fn connection(&self) -> ConnectionManager {
        self.manager.clone()
    }
}

#[async_trait]
impl FastCache for RedisService {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection();
        conn.get(key)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to read {} from Redis: {}", key, e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.connection();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to write {} to Redis: {}", key, e)))
    }

    fn supports_pattern_delete(&self) -> bool {
        true
    }

    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let mut conn = self.connection();

        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(pattern)
                .await
                .map_err(|e| AppError::Cache(format!("Failed to scan {} in Redis: {}", pattern, e)))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        let mut deleted = 0u64;
        for batch in keys.chunks(DELETE_BATCH) {
            let n: u64 = conn
                .del(batch)
                .await
                .map_err(|e| AppError::Cache(format!("Failed to delete {} from Redis: {}", pattern, e)))?;
            deleted += n;
        }

        tracing::debug!("Deleted {} Redis keys matching {}", deleted, pattern);
        Ok(deleted)
    }
}
