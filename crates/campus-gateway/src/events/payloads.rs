//! Event payload definitions
//!
//! Payloads the gateway builds itself. Events relayed from Redis Pub/Sub
//! carry the JSON the service layer published and need no types here.

use campus_core::Snowflake;
use campus_service::{RoomResponse, TypingUserResponse};
use serde::Serialize;

/// READY event payload
///
/// Sent right after Hello, once the identity headers have been resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyEvent {
    /// Gateway protocol version
    pub v: i32,

    /// Current user
    pub user: UserPayload,

    /// Session ID assigned to this socket
    pub session_id: String,

    /// Rooms the user can subscribe to (their memberships)
    pub rooms: Vec<RoomResponse>,
}

/// User data included in events
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub display_name: String,
}

/// TYPING_SNAPSHOT event payload
///
/// Sent after a successful room subscribe so the client does not wait for
/// the next keystroke to learn who is already typing.
#[derive(Debug, Clone, Serialize)]
pub struct TypingSnapshotEvent {
    pub room_id: Snowflake,
    pub typing: Vec<TypingUserResponse>,
}

/// SUBSCRIPTION_DENIED event payload
///
/// Carries only the room id. The socket stays open; other subscriptions
/// are unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDeniedEvent {
    pub room_id: Snowflake,
}
