//! Room service
//!
//! Handles room creation and queries for all three room types: the campus
//! singleton, open group rooms, and two-person direct rooms.

use campus_core::entities::{Participant, Room};
use campus_core::{DomainError, RoomCapabilities, Snowflake};
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{ParticipantResponse, ParticipantWithProfile, RoomResponse};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Room service
pub struct RoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get the campus room, creating it on first access
    ///
    /// Creation is guarded by the partial unique index on the room type;
    /// a racer that loses the insert re-reads the winner's row. The
    /// requesting user gets a participant row either way, purely for
    /// bookkeeping (campus access never depends on membership).
    #[instrument(skip(self))]
    pub async fn get_or_create_campus_room(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        let room = match self.ctx.room_repo().find_campus().await? {
            Some(room) => room,
            None => {
                let room = Room::new_campus(self.ctx.generate_id(), user_id);
                match self.ctx.room_repo().create(&room).await {
                    Ok(()) => {
                        info!(room_id = %room.id, "Campus room created");
                        room
                    }
                    // Lost the creation race; the winner's row is there now
                    Err(DomainError::CampusRoomExists) => self
                        .ctx
                        .room_repo()
                        .find_campus()
                        .await?
                        .ok_or_else(|| ServiceError::internal("Campus room vanished after conflict"))?,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        self.ctx
            .participant_repo()
            .add(&Participant::new(room.id, user_id))
            .await?;

        Ok(RoomResponse::from(room))
    }

    /// Create an open room with an initial invitee
    ///
    /// Open rooms are ungated, so duplicate rooms for the same people are
    /// allowed; the room and both membership rows still commit together.
    #[instrument(skip(self))]
    pub async fn create_open_room(
        &self,
        creator_id: Snowflake,
        invitee_id: Snowflake,
        name: Option<String>,
    ) -> ServiceResult<RoomResponse> {
        if creator_id == invitee_id {
            return Err(ServiceError::validation("Cannot create a room with yourself"));
        }

        // Verify the invitee exists
        self.ctx
            .profile_repo()
            .find_by_id(invitee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", invitee_id.to_string()))?;

        let room = Room::new_open(self.ctx.generate_id(), creator_id, name);
        self.ctx
            .room_repo()
            .create_with_participants(&room, creator_id, invitee_id)
            .await?;

        info!(
            room_id = %room.id,
            creator_id = %creator_id,
            invitee_id = %invitee_id,
            "Open room created"
        );

        self.publish_room_create(&room, &[creator_id, invitee_id]).await;

        Ok(RoomResponse::from(room))
    }

    /// Open the direct room with another user, creating it if needed
    ///
    /// Returns the existing room when the pair already has one; a creation
    /// race is settled by the pair_key unique index and the loser re-reads.
    #[instrument(skip(self))]
    pub async fn open_direct_room(
        &self,
        user_id: Snowflake,
        recipient_id: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        if user_id == recipient_id {
            return Err(DomainError::SelfDirectRoom.into());
        }

        // Verify the recipient exists
        self.ctx
            .profile_repo()
            .find_by_id(recipient_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", recipient_id.to_string()))?;

        let (room, created) = self.ensure_direct_room(user_id, recipient_id).await?;

        if created {
            self.publish_room_create(&room, &[user_id, recipient_id]).await;
        }

        Ok(RoomResponse::from(room))
    }

    /// Look up or create the direct room for a pair
    ///
    /// Also the path the connection-request acceptance trigger takes.
    /// Returns the room and whether this call created it.
    #[instrument(skip(self))]
    pub async fn ensure_direct_room(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> ServiceResult<(Room, bool)> {
        if let Some(existing) = self.ctx.room_repo().find_direct(a, b).await? {
            return Ok((existing, false));
        }

        let room = Room::new_direct(self.ctx.generate_id(), a, b);
        match self
            .ctx
            .room_repo()
            .create_with_participants(&room, a, b)
            .await
        {
            Ok(()) => {
                info!(room_id = %room.id, a = %a, b = %b, "Direct room created");
                Ok((room, true))
            }
            // Another caller created the pair's room first; return theirs
            Err(DomainError::DirectRoomExists) => {
                let existing = self
                    .ctx
                    .room_repo()
                    .find_direct(a, b)
                    .await?
                    .ok_or_else(|| ServiceError::internal("Direct room vanished after conflict"))?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Rooms visible to the user: their memberships plus the campus room
    #[instrument(skip(self))]
    pub async fn list_rooms_for(&self, user_id: Snowflake) -> ServiceResult<Vec<RoomResponse>> {
        let rooms = self.ctx.room_repo().find_by_user(user_id).await?;
        Ok(rooms.into_iter().map(RoomResponse::from).collect())
    }

    /// Get a single room, gated by read access
    #[instrument(skip(self))]
    pub async fn get_room(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<RoomResponse> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        Ok(RoomResponse::from(room))
    }

    /// List a room's participants, gated by the view capability
    #[instrument(skip(self))]
    pub async fn room_participants(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ParticipantResponse>> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::VIEW_PARTICIPANTS)
            .await?;

        let participants = self.ctx.participant_repo().find_by_room(room_id).await?;

        let user_ids: Vec<Snowflake> = participants.iter().map(|p| p.user_id).collect();
        let profiles = self.ctx.profile_repo().find_many(&user_ids).await?;

        Ok(participants
            .into_iter()
            .map(|participant| {
                let profile = profiles.iter().find(|p| p.id == participant.user_id).cloned();
                ParticipantResponse::from(ParticipantWithProfile { participant, profile })
            })
            .collect())
    }

    /// Add a member to a room
    ///
    /// Open-room self-join and campus bookkeeping both come through here.
    /// Direct rooms never grow past their pair: once both rows exist, only
    /// re-adding an existing member (a no-op) is allowed.
    #[instrument(skip(self))]
    pub async fn add_participant(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        new_member_id: Snowflake,
    ) -> ServiceResult<()> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, actor_id, RoomCapabilities::ADD_PARTICIPANTS)
            .await?;

        if room.is_direct() {
            let already_member = self
                .ctx
                .participant_repo()
                .is_participant(room_id, new_member_id)
                .await?;
            if !already_member {
                let current = self.ctx.participant_repo().find_by_room(room_id).await?;
                if current.len() >= 2 {
                    return Err(ServiceError::validation(
                        "Direct rooms are limited to two participants",
                    ));
                }
            }
        }

        self.ctx
            .participant_repo()
            .add(&Participant::new(room_id, new_member_id))
            .await?;

        Ok(())
    }

    /// Fetch a room or fail with not-found
    async fn find_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id.to_string()))
    }

    /// Helper to publish ROOM_CREATE to every initial member's channel
    async fn publish_room_create(&self, room: &Room, member_ids: &[Snowflake]) {
        let data = json!({
            "id": room.id.to_string(),
            "name": room.name,
            "room_type": room.room_type,
            "created_by": room.created_by.to_string(),
            "participant_ids": member_ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });

        self.ctx
            .publisher()
            .publish_to_users(member_ids, "ROOM_CREATE", data)
            .await
            .ok();
    }
}
