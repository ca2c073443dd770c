//! Client payload definitions
//!
//! Defines the payload structures for client-to-server messages.

use campus_core::Snowflake;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Default heartbeat interval (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    /// Create a new Hello payload with default interval
    #[must_use]
    pub fn new() -> Self {
        Self {
            heartbeat_interval: Self::DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Create a Hello payload with custom interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for room-targeted client ops
///
/// Subscribe, Unsubscribe, TypingStart, and TypingStop all carry the same
/// shape: the room the op applies to. Snowflakes travel as strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTargetPayload {
    /// Target room ID
    pub room_id: Snowflake,
}

impl RoomTargetPayload {
    /// Create a payload for a room
    #[must_use]
    pub fn new(room_id: Snowflake) -> Self {
        Self { room_id }
    }
}
