//! Temporary download URL tokens in Redis.
//!
//! Attachment downloads go through opaque single-purpose tokens with a short
//! TTL instead of exposing storage paths. The token is the whole secret;
//! expiry is enforced by Redis, not by application bookkeeping.

use crate::pool::{RedisPool, RedisResult};
use campus_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Key prefix for temporary URL tokens
const TEMP_URL_PREFIX: &str = "temp_url:";

/// Default token TTL (5 minutes)
const DEFAULT_TEMP_URL_TTL: u64 = 300;

/// Data a temporary URL token resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempUrlData {
    /// Attachment this token grants access to
    pub attachment_id: Snowflake,
    /// Storage path of the file
    pub path: String,
    /// Original filename, used for the download disposition
    pub filename: String,
    /// MIME type of the file
    pub content_type: String,
    /// Token creation timestamp (Unix epoch seconds)
    pub created_at: i64,
}

impl TempUrlData {
    /// Create new token data
    #[must_use]
    pub fn new(
        attachment_id: Snowflake,
        path: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            attachment_id,
            path: path.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Store for temporary download URL tokens
#[derive(Clone)]
pub struct TempUrlStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl TempUrlStore {
    /// Create a new store with the default TTL
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: DEFAULT_TEMP_URL_TTL,
        }
    }

    /// Create with custom TTL
    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    /// Generate Redis key for a token
    fn key(token: &str) -> String {
        format!("{TEMP_URL_PREFIX}{token}")
    }

    /// Store a token
    pub async fn store(&self, token: &str, data: &TempUrlData) -> RedisResult<()> {
        let key = Self::key(token);
        self.pool.set(&key, data, Some(self.ttl_seconds)).await?;

        tracing::debug!(
            attachment_id = %data.attachment_id,
            ttl_seconds = self.ttl_seconds,
            "Stored temporary URL token"
        );

        Ok(())
    }

    /// Resolve a token (returns None once expired)
    pub async fn resolve(&self, token: &str) -> RedisResult<Option<TempUrlData>> {
        let key = Self::key(token);
        self.pool.get_value(&key).await
    }

    /// Revoke a token before its TTL runs out
    pub async fn revoke(&self, token: &str) -> RedisResult<bool> {
        let key = Self::key(token);
        self.pool.delete(&key).await
    }

    /// Configured token lifetime in seconds
    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}
