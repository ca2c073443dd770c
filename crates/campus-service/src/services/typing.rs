//! Typing indicator service
//!
//! Ephemeral presence only: signals live in short-TTL Redis keys and are
//! broadcast over pub/sub. Nothing here ever reaches durable storage.

use campus_cache::TypingData;
use campus_core::entities::Room;
use campus_core::{RoomCapabilities, Snowflake};
use serde_json::json;
use tracing::instrument;

use crate::dto::TypingUserResponse;

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Typing indicator service
pub struct TypingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TypingService<'a> {
    /// Create a new TypingService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Signal that a user started typing
    ///
    /// Repeat calls refresh the TTL. The signal fans out to everyone in the
    /// room except the typist.
    #[instrument(skip(self))]
    pub async fn start(&self, room_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::SEND_MESSAGES)
            .await?;

        let display_name = self
            .ctx
            .profile_repo()
            .find_by_id(user_id)
            .await?
            .map(|p| p.display_name)
            .unwrap_or_else(|| "Unknown".to_string());

        let typing = TypingData::new(user_id, room_id, display_name);
        self.ctx.typing_store().set_typing(&typing).await?;

        let data = json!({
            "user_id": typing.user_id.to_string(),
            "room_id": typing.room_id.to_string(),
            "display_name": typing.display_name,
            "started_at": typing.started_at,
        });
        self.ctx
            .publisher()
            .publish_typing("TYPING_START", room_id, user_id, data)
            .await
            .ok();

        Ok(())
    }

    /// Signal that a user stopped typing
    ///
    /// The stop broadcast goes out even when no indicator was present, so
    /// client state converges after a missed start.
    #[instrument(skip(self))]
    pub async fn stop(&self, room_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::SEND_MESSAGES)
            .await?;

        self.ctx.typing_store().remove_typing(room_id, user_id).await?;
        self.publish_stop(room_id, user_id).await;

        Ok(())
    }

    /// Snapshot of everyone currently typing in a room
    ///
    /// Served to freshly subscribed clients so they do not wait for the
    /// next signal to learn who is mid-keystroke.
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        room_id: Snowflake,
        viewer_id: Snowflake,
    ) -> ServiceResult<Vec<TypingUserResponse>> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, viewer_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        let typing = self.ctx.typing_store().room_typing(room_id).await?;
        Ok(typing.into_iter().map(TypingUserResponse::from).collect())
    }

    /// Clear every indicator a user holds in the given rooms
    ///
    /// Disconnect path: the gateway already knows which rooms the socket
    /// was subscribed to, so no capability check runs here.
    #[instrument(skip(self, room_ids))]
    pub async fn clear_for_user(
        &self,
        room_ids: &[Snowflake],
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ctx.typing_store().clear_user(room_ids, user_id).await?;

        for &room_id in room_ids {
            self.publish_stop(room_id, user_id).await;
        }

        Ok(())
    }

    async fn publish_stop(&self, room_id: Snowflake, user_id: Snowflake) {
        let data = json!({
            "user_id": user_id.to_string(),
            "room_id": room_id.to_string(),
        });
        self.ctx
            .publisher()
            .publish_typing("TYPING_STOP", room_id, user_id, data)
            .await
            .ok();
    }

    async fn find_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id.to_string()))
    }
}
