//! Access service
//!
//! Resolves the facts the room access policy needs and evaluates them.
//! The policy itself lives in `campus_core::policy` and never touches
//! the database; this service is the only place that feeds it.

use campus_core::entities::{Room, RoomType};
use campus_core::{AccessFacts, RoomCapabilities, Snowflake};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Access service for room capability checks
pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    /// Create a new AccessService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the access facts for a (user, room) pair
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub async fn facts(&self, room: &Room, user_id: Snowflake) -> ServiceResult<AccessFacts> {
        let is_participant = match room.room_type {
            // Type alone decides for campus and open; skip the membership query
            RoomType::Campus | RoomType::Open => false,
            RoomType::Direct => {
                self.ctx
                    .participant_repo()
                    .is_participant(room.id, user_id)
                    .await?
            }
        };

        Ok(AccessFacts::new(
            room.room_type,
            room.created_by == user_id,
            is_participant,
        ))
    }

    /// Capabilities the user holds in the room
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub async fn capabilities(
        &self,
        room: &Room,
        user_id: Snowflake,
    ) -> ServiceResult<RoomCapabilities> {
        Ok(self.facts(room, user_id).await?.capabilities())
    }

    /// Check a single capability without failing
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub async fn check(
        &self,
        room: &Room,
        user_id: Snowflake,
        capability: RoomCapabilities,
    ) -> ServiceResult<bool> {
        Ok(self.capabilities(room, user_id).await?.contains(capability))
    }

    /// Check a capability and return the generic denial if missing
    ///
    /// The error never names the missing capability; callers learn only
    /// that access was denied.
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub async fn require(
        &self,
        room: &Room,
        user_id: Snowflake,
        capability: RoomCapabilities,
    ) -> ServiceResult<()> {
        if !self.check(room, user_id, capability).await? {
            return Err(ServiceError::PermissionDenied);
        }
        Ok(())
    }
}
