//! Room and participant database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rooms table
#[derive(Debug, Clone, FromRow)]
pub struct RoomModel {
    pub id: i64,
    pub name: Option<String>,
    /// 0 = campus, 1 = open, 2 = direct
    pub room_type: i16,
    pub created_by: i64,
    pub pair_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoomModel {
    /// Check if this is the campus-wide room
    #[inline]
    pub fn is_campus(&self) -> bool {
        self.room_type == 0
    }

    /// Check if this is a direct room
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.room_type == 2
    }
}

/// Database model for room_participants table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub room_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
}
