//! Gateway event types
//!
//! Defines all event type names for dispatch messages. Most originate in the
//! service layer and arrive over Redis Pub/Sub; Ready, TypingSnapshot, and
//! SubscriptionDenied are built by the gateway itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
///
/// These are the event names sent in the `t` field of dispatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    // Connection events
    /// Sent after the socket opens, with the caller's visible rooms
    Ready,

    // Room events
    /// Room created (direct room from an accepted connection, or open room)
    RoomCreate,
    /// Room subscription refused
    SubscriptionDenied,

    // Message events
    /// New message in a subscribed room
    MessageCreate,
    /// Message soft-deleted by its sender
    MessageDelete,

    // Receipt events
    /// First read receipt for a (message, reader) pair
    ReceiptCreate,

    // Typing events
    /// User started typing
    TypingStart,
    /// User stopped typing
    TypingStop,
    /// Current typists in a room, sent on subscribe
    TypingSnapshot,

    // Connection-request events
    /// Incoming connection request
    ConnectionRequest,
    /// Connection request accepted; a direct room now exists
    ConnectionAccepted,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::RoomCreate => "ROOM_CREATE",
            Self::SubscriptionDenied => "SUBSCRIPTION_DENIED",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::ReceiptCreate => "RECEIPT_CREATE",
            Self::TypingStart => "TYPING_START",
            Self::TypingStop => "TYPING_STOP",
            Self::TypingSnapshot => "TYPING_SNAPSHOT",
            Self::ConnectionRequest => "CONNECTION_REQUEST",
            Self::ConnectionAccepted => "CONNECTION_ACCEPTED",
        }
    }

    /// Parse an event type from a string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(Self::Ready),
            "ROOM_CREATE" => Some(Self::RoomCreate),
            "SUBSCRIPTION_DENIED" => Some(Self::SubscriptionDenied),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            "MESSAGE_DELETE" => Some(Self::MessageDelete),
            "RECEIPT_CREATE" => Some(Self::ReceiptCreate),
            "TYPING_START" => Some(Self::TypingStart),
            "TYPING_STOP" => Some(Self::TypingStop),
            "TYPING_SNAPSHOT" => Some(Self::TypingSnapshot),
            "CONNECTION_REQUEST" => Some(Self::ConnectionRequest),
            "CONNECTION_ACCEPTED" => Some(Self::ConnectionAccepted),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GatewayEventType> for String {
    fn from(event: GatewayEventType) -> Self {
        event.as_str().to_string()
    }
}
