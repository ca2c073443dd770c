//! Redis Pub/Sub channel naming.
//!
//! Three scopes cover every event the gateway fans out: a `room:{id}`
//! channel per room, a `user:{id}` channel per signed-in user, and one
//! `broadcast` channel for process-wide announcements. Channel names are
//! plain strings on the wire; this module is the single place that
//! builds and parses them.

use campus_core::Snowflake;

/// Name of the process-wide announcement channel
pub const BROADCAST_CHANNEL: &str = "broadcast";

/// A parsed Pub/Sub channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events delivered to everyone in one room
    Room(Snowflake),
    /// Events delivered to every connection of one user
    User(Snowflake),
    /// Events delivered to all connected clients
    Broadcast,
    /// A name outside the known scheme, kept verbatim
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn room(room_id: Snowflake) -> Self {
        Self::Room(room_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    #[must_use]
    pub fn broadcast() -> Self {
        Self::Broadcast
    }

    /// Render the wire-format channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("room:{id}"),
            Self::User(id) => format!("user:{id}"),
            Self::Broadcast => BROADCAST_CHANNEL.to_string(),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a wire-format name back into a channel.
    ///
    /// Anything that is not `broadcast` or a well-formed `room:`/`user:`
    /// name comes back as `Custom`, never an error; subscribers log and
    /// skip such messages rather than die on them.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == BROADCAST_CHANNEL {
            return Self::Broadcast;
        }

        name.split_once(':')
            .and_then(|(scope, raw)| {
                let id = Snowflake::from(raw.parse::<i64>().ok()?);
                match scope {
                    "room" => Some(Self::Room(id)),
                    "user" => Some(Self::User(id)),
                    _ => None,
                }
            })
            .unwrap_or_else(|| Self::Custom(name.to_string()))
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
