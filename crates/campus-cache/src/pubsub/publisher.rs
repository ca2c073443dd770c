//! Redis Pub/Sub publisher.
//!
//! Publishes events to Redis channels for distribution to WebSocket clients.

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "MESSAGE_CREATE", "TYPING_START")
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
    /// Optional target information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EventTarget>,
}

/// Target information for event routing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTarget {
    /// Room ID (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    /// User IDs to exclude from receiving this event
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exclude_users: Vec<String>,
}

impl PubSubEvent {
    /// Create a new event
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            target: None,
        }
    }

    /// Add target information
    #[must_use]
    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl EventTarget {
    /// Create an empty target
    #[must_use]
    pub fn empty() -> Self {
        Self {
            room_id: None,
            exclude_users: Vec::new(),
        }
    }

    /// Set room ID
    #[must_use]
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Add user to exclude list
    #[must_use]
    pub fn exclude_user(mut self, user_id: impl Into<String>) -> Self {
        self.exclude_users.push(user_id.into());
        self
    }
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = event.to_json()?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event.event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }

    /// Publish to multiple channels
    pub async fn publish_many(
        &self,
        channels: &[PubSubChannel],
        event: &PubSubEvent,
    ) -> RedisResult<u32> {
        let payload = event.to_json()?;
        let mut total_receivers = 0;
        let mut conn = self.pool.get().await?;

        for channel in channels {
            let channel_name = channel.name();
            let receivers: u32 = conn.publish(&channel_name, &payload).await?;
            total_receivers += receivers;
        }

        tracing::debug!(
            channels = channels.len(),
            event_type = %event.event_type,
            total_receivers = total_receivers,
            "Published event to multiple channels"
        );

        Ok(total_receivers)
    }
}

/// Convenience methods for common event types
impl Publisher {
    /// Publish a room event (message create/delete, receipts, membership)
    pub async fn publish_room_event(
        &self,
        event_type: &str,
        room_id: campus_core::Snowflake,
        data: serde_json::Value,
    ) -> RedisResult<u32> {
        let event = PubSubEvent::new(event_type, data)
            .with_target(EventTarget::empty().with_room(room_id.to_string()));
        let channel = PubSubChannel::room(room_id);
        self.publish(&channel, &event).await
    }

    /// Publish a typing signal, excluding the typist from the fan-out
    pub async fn publish_typing(
        &self,
        event_type: &str,
        room_id: campus_core::Snowflake,
        typist_id: campus_core::Snowflake,
        data: serde_json::Value,
    ) -> RedisResult<u32> {
        let target = EventTarget::empty()
            .with_room(room_id.to_string())
            .exclude_user(typist_id.to_string());
        let event = PubSubEvent::new(event_type, data).with_target(target);
        let channel = PubSubChannel::room(room_id);
        self.publish(&channel, &event).await
    }

    /// Publish a user-specific event
    pub async fn publish_to_user(
        &self,
        user_id: campus_core::Snowflake,
        event_type: &str,
        data: serde_json::Value,
    ) -> RedisResult<u32> {
        let event = PubSubEvent::new(event_type, data);
        let channel = PubSubChannel::user(user_id);
        self.publish(&channel, &event).await
    }

    /// Publish the same event to several users' channels (room creation,
    /// connection acceptance)
    pub async fn publish_to_users(
        &self,
        user_ids: &[campus_core::Snowflake],
        event_type: &str,
        data: serde_json::Value,
    ) -> RedisResult<u32> {
        let event = PubSubEvent::new(event_type, data);
        let channels: Vec<PubSubChannel> =
            user_ids.iter().map(|&id| PubSubChannel::user(id)).collect();
        self.publish_many(&channels, &event).await
    }
}
