//! Shared Redis connection pool.
//!
//! One pool serves every Redis consumer in the process: typing indicators,
//! temporary attachment URLs and event publishing all check connections out
//! of the same deadpool. Values go in as JSON strings.

use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use std::sync::Arc;

/// Redis pool settings
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Connection URL, `redis://host:port`
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 16,
        }
    }
}

impl From<&campus_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &campus_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Errors surfaced by pool construction and Redis commands
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Redis pool construction failed: {0}")]
    Build(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Stored value is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result type for Redis operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    /// Build a pool for the given settings. Connections are opened lazily,
    /// so this succeeds even when Redis is down.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        // Log only the part after any credential '@'
        let host = config.url.rsplit('@').next().unwrap_or(&config.url);
        tracing::info!(
            redis = %host,
            max_connections = config.max_connections,
            "Redis pool ready"
        );

        Ok(Self { pool })
    }

    /// Build a pool already wrapped for cross-task sharing
    pub fn shared(config: RedisPoolConfig) -> RedisResult<SharedRedisPool> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// Check a connection out of the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Current pool occupancy
    #[must_use]
    pub fn status(&self) -> deadpool_redis::Status {
        self.pool.status()
    }

    /// Round-trip a PING to verify Redis is reachable
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Store a value as JSON, with an optional TTL in seconds
    pub async fn set<V: serde::Serialize>(
        &self,
        key: &str,
        value: &V,
        ttl_seconds: Option<u64>,
    ) -> RedisResult<()> {
        let body = serde_json::to_string(value)?;
        let mut conn = self.get().await?;

        if let Some(ttl) = ttl_seconds {
            conn.set_ex::<_, _, ()>(key, body, ttl).await?;
        } else {
            conn.set::<_, _, ()>(key, body).await?;
        }

        Ok(())
    }

    /// Fetch and decode a JSON value. `None` when the key is absent or
    /// its TTL has fired.
    pub async fn get_value<V: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> RedisResult<Option<V>> {
        let mut conn = self.get().await?;
        let raw: Option<String> = conn.get(key).await?;
        Ok(raw.map(|v| serde_json::from_str(&v)).transpose()?)
    }

    /// Delete a key, reporting whether it existed
    pub async fn delete(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        let removed: u32 = conn.del(key).await?;
        Ok(removed > 0)
    }

    /// Delete several keys in one round trip, returning how many existed
    pub async fn delete_many(&self, keys: &[&str]) -> RedisResult<u32> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get().await?;
        let removed: u32 = conn.del(keys).await?;
        Ok(removed)
    }

    /// Check whether a key exists
    pub async fn exists(&self, key: &str) -> RedisResult<bool> {
        let mut conn = self.get().await?;
        Ok(conn.exists(key).await?)
    }

    /// Collect all keys matching a pattern via cursor-based SCAN.
    ///
    /// SCAN walks the keyspace in batches of roughly `count`, so unlike
    /// KEYS it never blocks Redis on a large keyspace.
    pub async fn scan_keys(&self, pattern: &str, count: usize) -> RedisResult<Vec<String>> {
        let mut conn = self.get().await?;
        let mut found = Vec::new();
        let mut cursor = 0u64;

        loop {
            let (next, mut batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count)
                .query_async(&mut conn)
                .await?;

            found.append(&mut batch);
            if next == 0 {
                return Ok(found);
            }
            cursor = next;
        }
    }
}

/// Pool handle shared across tasks
pub type SharedRedisPool = Arc<RedisPool>;
