//! Room and Participant entity <-> model mappers

use campus_core::entities::{Participant, Room, RoomType};
use campus_core::value_objects::Snowflake;

use crate::models::{ParticipantModel, RoomModel};

/// Convert RoomModel to Room entity
impl From<RoomModel> for Room {
    fn from(model: RoomModel) -> Self {
        Room {
            id: Snowflake::new(model.id),
            name: model.name,
            room_type: RoomType::from(model.room_type),
            created_by: Snowflake::new(model.created_by),
            pair_key: model.pair_key,
            created_at: model.created_at,
        }
    }
}

/// Convert ParticipantModel to Participant entity
impl From<ParticipantModel> for Participant {
    fn from(model: ParticipantModel) -> Self {
        Participant {
            room_id: Snowflake::new(model.room_id),
            user_id: Snowflake::new(model.user_id),
            joined_at: model.joined_at,
        }
    }
}
