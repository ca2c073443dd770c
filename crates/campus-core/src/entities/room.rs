//! Room entity - a conversation context (campus, open, or direct)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Room type enum
///
/// The type is immutable after creation and is what the access policy keys
/// on: campus and open rooms are readable and writable by every
/// authenticated user, direct rooms only by their two participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RoomType {
    /// The single campus-wide room
    Campus = 0,
    /// Ungated group room anyone may read and join
    Open = 1,
    /// Two-person room gated by participant rows
    Direct = 2,
}

impl RoomType {
    /// Get the numeric value for database storage
    #[inline]
    #[must_use]
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Whether access to this room type depends on membership
    #[inline]
    #[must_use]
    pub fn is_gated(self) -> bool {
        matches!(self, Self::Direct)
    }
}

impl From<i16> for RoomType {
    fn from(value: i16) -> Self {
        match value {
            0 => Self::Campus,
            1 => Self::Open,
            // Unknown values fall back to the most restrictive type
            _ => Self::Direct,
        }
    }
}

impl From<RoomType> for i16 {
    fn from(rt: RoomType) -> Self {
        rt as i16
    }
}

/// Normalized identity of an unordered user pair, used to serialize
/// duplicate direct-room (and connection-request) creation races behind a
/// unique index.
#[must_use]
pub fn direct_pair_key(a: Snowflake, b: Snowflake) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

/// Room entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Snowflake,
    pub name: Option<String>,
    pub room_type: RoomType,
    pub created_by: Snowflake,
    /// Set for direct rooms only; `direct_pair_key` of the two participants
    pub pair_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Create the campus room record
    #[must_use]
    pub fn new_campus(id: Snowflake, created_by: Snowflake) -> Self {
        Self {
            id,
            name: Some("campus".to_string()),
            room_type: RoomType::Campus,
            created_by,
            pair_key: None,
            created_at: Utc::now(),
        }
    }

    /// Create an open room
    #[must_use]
    pub fn new_open(id: Snowflake, created_by: Snowflake, name: Option<String>) -> Self {
        Self {
            id,
            name,
            room_type: RoomType::Open,
            created_by,
            pair_key: None,
            created_at: Utc::now(),
        }
    }

    /// Create a direct room between two users
    #[must_use]
    pub fn new_direct(id: Snowflake, created_by: Snowflake, other: Snowflake) -> Self {
        Self {
            id,
            name: None,
            room_type: RoomType::Direct,
            created_by,
            pair_key: Some(direct_pair_key(created_by, other)),
            created_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_campus(&self) -> bool {
        matches!(self.room_type, RoomType::Campus)
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.room_type, RoomType::Open)
    }

    #[inline]
    #[must_use]
    pub fn is_direct(&self) -> bool {
        matches!(self.room_type, RoomType::Direct)
    }

    /// Display name (room name or fallback for direct rooms)
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Direct chat")
    }
}
