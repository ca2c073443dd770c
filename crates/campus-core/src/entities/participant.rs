//! Participant entity - a user's membership edge into a room

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Room membership record, unique per (room, user)
///
/// Required for direct-room access; kept for campus/open rooms purely as
/// bookkeeping since those types bypass the membership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub room_id: Snowflake,
    pub user_id: Snowflake,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(room_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            room_id,
            user_id,
            joined_at: Utc::now(),
        }
    }
}
