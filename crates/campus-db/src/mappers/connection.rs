//! ConnectionRequest entity <-> model mapper

use campus_core::entities::{ConnectionRequest, ConnectionStatus};
use campus_core::value_objects::Snowflake;

use crate::models::ConnectionRequestModel;

/// Convert ConnectionRequestModel to ConnectionRequest entity
impl From<ConnectionRequestModel> for ConnectionRequest {
    fn from(model: ConnectionRequestModel) -> Self {
        ConnectionRequest {
            id: Snowflake::new(model.id),
            requester_id: Snowflake::new(model.requester_id),
            addressee_id: Snowflake::new(model.addressee_id),
            status: ConnectionStatus::from(model.status),
            pair_key: model.pair_key,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
