//! Typing indicator storage in Redis.
//!
//! Typing state is ephemeral: it lives only in short-TTL keys so that a
//! crashed client or a missed stop signal can never leave a phantom typist
//! behind. Nothing here ever touches durable storage.

use crate::pool::{RedisPool, RedisResult};
use campus_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Key prefix for typing indicators
const TYPING_PREFIX: &str = "typing:";

/// Typing indicator TTL. Clients stop after 2 seconds of inactivity; the
/// TTL is the server-side backstop for clients that never say stop.
const TYPING_TTL: u64 = 10;

/// Typing indicator data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingData {
    /// User who is typing
    pub user_id: Snowflake,
    /// Room where typing
    pub room_id: Snowflake,
    /// Display name, carried so observers need no profile lookup
    pub display_name: String,
    /// Typing start timestamp (Unix epoch seconds)
    pub started_at: i64,
}

impl TypingData {
    /// Create new typing indicator
    #[must_use]
    pub fn new(user_id: Snowflake, room_id: Snowflake, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            room_id,
            display_name: display_name.into(),
            started_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Typing indicator store
#[derive(Clone)]
pub struct TypingStore {
    pool: RedisPool,
}

impl TypingStore {
    /// Create a new typing store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Generate Redis key for a typing indicator
    fn key(room_id: Snowflake, user_id: Snowflake) -> String {
        format!("{TYPING_PREFIX}{room_id}:{user_id}")
    }

    /// Set a typing indicator (refreshes the TTL on every keystroke signal)
    pub async fn set_typing(&self, typing: &TypingData) -> RedisResult<()> {
        let key = Self::key(typing.room_id, typing.user_id);
        self.pool.set(&key, typing, Some(TYPING_TTL)).await?;

        tracing::trace!(
            user_id = %typing.user_id,
            room_id = %typing.room_id,
            "Set typing indicator"
        );

        Ok(())
    }

    /// Remove a typing indicator (explicit stop or message send)
    pub async fn remove_typing(&self, room_id: Snowflake, user_id: Snowflake) -> RedisResult<bool> {
        let key = Self::key(room_id, user_id);
        self.pool.delete(&key).await
    }

    /// Check if user is typing in a room
    pub async fn is_typing(&self, room_id: Snowflake, user_id: Snowflake) -> RedisResult<bool> {
        let key = Self::key(room_id, user_id);
        self.pool.exists(&key).await
    }

    /// Snapshot of everyone currently typing in a room.
    ///
    /// A fresh subscriber calls this on join; it sees only active typists,
    /// never historical signals.
    pub async fn room_typing(&self, room_id: Snowflake) -> RedisResult<Vec<TypingData>> {
        let pattern = format!("{TYPING_PREFIX}{room_id}:*");
        let keys = self.pool.scan_keys(&pattern, 100).await?;

        let mut typing = Vec::new();
        for key in keys {
            if let Some(data) = self.pool.get_value::<TypingData>(&key).await? {
                typing.push(data);
            }
        }

        Ok(typing)
    }

    /// Clear every typing indicator a user holds in the given rooms.
    ///
    /// Called when a connection drops, so observers see the typist vanish
    /// rather than linger until the TTL fires.
    pub async fn clear_user(&self, room_ids: &[Snowflake], user_id: Snowflake) -> RedisResult<u32> {
        let keys: Vec<String> = room_ids
            .iter()
            .map(|room_id| Self::key(*room_id, user_id))
            .collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.pool.delete_many(&key_refs).await
    }
}
