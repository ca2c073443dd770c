//! # campus-cache
//!
//! Redis caching layer for typing presence, temporary URLs, and pub/sub messaging.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Typing Presence**: Short-TTL typing indicators with room snapshots
//! - **Temp URLs**: Expiring download tokens for attachments
//! - **Pub/Sub**: Real-time event distribution across server instances
//!
//! ## Example
//!
//! ```ignore
//! use campus_cache::{PubSubChannel, PubSubEvent, Publisher, RedisPool, RedisPoolConfig, TypingStore};
//!
//! // Create Redis pool
//! let config = RedisPoolConfig::default();
//! let pool = RedisPool::new(config)?;
//!
//! // Create stores
//! let typing_store = TypingStore::new(pool.clone());
//! let publisher = Publisher::new(pool.clone());
//!
//! // Mark a user as typing
//! let typing = TypingData::new(user_id, room_id, "Kim Minjun");
//! typing_store.set_typing(&typing).await?;
//!
//! // Publish event
//! let event = PubSubEvent::new("TYPING_START", data);
//! publisher.publish(&PubSubChannel::room(room_id), &event).await?;
//! ```

pub mod pool;
pub mod pubsub;
pub mod tokens;
pub mod typing;

// Re-export pool types
pub use pool::{
    RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export typing types
pub use typing::{TypingData, TypingStore};

// Re-export token types
pub use tokens::{TempUrlData, TempUrlStore};

// Re-export pubsub types
pub use pubsub::{
    EventTarget, PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber,
    SubscriberConfig, SubscriberError, SubscriberResult, BROADCAST_CHANNEL,
};
