//! Read receipt service
//!
//! Explicit read marking, complementing the implicit read-on-view that
//! message listing performs.

use campus_core::entities::ReadReceipt;
use campus_core::{DomainError, RoomCapabilities, Snowflake};
use tracing::{info, instrument};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::message::MessageService;

/// Read receipt service
pub struct ReceiptService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReceiptService<'a> {
    /// Create a new ReceiptService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark a single message as read
    ///
    /// Idempotent: returns `true` when a receipt was created, `false` when
    /// the message was already read. Marking one's own message is rejected.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        room_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<bool> {
        let room = self
            .ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id.to_string()))?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id.to_string()))?;

        if message.room_id != room_id {
            return Err(ServiceError::not_found("Message", message_id.to_string()));
        }

        if message.sender_id == user_id {
            return Err(DomainError::OwnMessageReceipt.into());
        }

        let receipt = ReadReceipt::new(message_id, user_id);
        let created = self.ctx.receipt_repo().mark_read(&receipt).await?;

        if created {
            info!(message_id = %message_id, user_id = %user_id, "Message marked read");
            MessageService::new(self.ctx)
                .publish_receipts(room_id, user_id, &[message_id])
                .await;
        }

        Ok(created)
    }

    /// Mark every live message in a room as read
    ///
    /// Catch-up operation after a period offline. Returns how many messages
    /// were newly marked.
    #[instrument(skip(self))]
    pub async fn mark_room_read(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<usize> {
        let room = self
            .ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Room", room_id.to_string()))?;

        AccessService::new(self.ctx)
            .require(&room, user_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        let newly_read = self
            .ctx
            .receipt_repo()
            .mark_room_read(room_id, user_id)
            .await?;

        info!(room_id = %room_id, user_id = %user_id, count = newly_read.len(), "Room marked read");

        MessageService::new(self.ctx)
            .publish_receipts(room_id, user_id, &newly_read)
            .await;

        Ok(newly_read.len())
    }
}
