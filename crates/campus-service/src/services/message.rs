//! Message service
//!
//! Handles message sending, listing with read-receipt annotation, and
//! sender-only deletion.

use campus_core::entities::{Attachment, Message, Profile, Room};
use campus_core::traits::MessagePage;
use campus_core::{DomainError, RoomCapabilities, Snowflake};
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{MessageResponse, MessageWithDetails, SendMessageRequest};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::storage;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message to a room
    ///
    /// Validation order after the capability check: content length, then
    /// attachment type, then attachment size; each violation keeps its own
    /// error code. Empty content is allowed only alongside an attachment,
    /// in which case a placeholder derived from the filename is stored.
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        room_id: Snowflake,
        sender_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, sender_id, RoomCapabilities::SEND_MESSAGES)
            .await?;

        let max_content = self.ctx.chat().max_content_length;
        if request.content.chars().count() > max_content {
            return Err(DomainError::ContentTooLong { max: max_content }.into());
        }

        if let Some(meta) = &request.attachment {
            if !self.ctx.chat().is_allowed_type(&meta.content_type) {
                return Err(DomainError::AttachmentTypeNotAllowed {
                    content_type: meta.content_type.clone(),
                }
                .into());
            }
            let max_bytes = self.ctx.storage().max_file_size_bytes();
            if meta.size < 0 || meta.size as u64 > max_bytes {
                return Err(DomainError::AttachmentTooLarge { max_bytes }.into());
            }
        }

        if request.content.trim().is_empty() && request.attachment.is_none() {
            return Err(DomainError::EmptyMessage.into());
        }

        let message_id = self.ctx.generate_id();

        let attachment = request.attachment.as_ref().map(|meta| {
            Attachment::new(
                self.ctx.generate_id(),
                message_id,
                meta.filename.clone(),
                meta.content_type.clone(),
                meta.size,
                meta.path.clone(),
            )
        });

        let content = if request.content.trim().is_empty() {
            // Guarded above: empty content implies an attachment exists
            attachment
                .as_ref()
                .map(Attachment::placeholder_content)
                .unwrap_or_default()
        } else {
            request.content
        };

        let message = Message::new(message_id, room_id, sender_id, content);
        self.ctx
            .message_repo()
            .create(&message, attachment.as_ref())
            .await?;

        let sender = self.ctx.profile_repo().find_by_id(sender_id).await?;

        info!(message_id = %message_id, room_id = %room_id, "Message sent");

        self.publish_message_create(&message, attachment.as_ref(), sender.as_ref())
            .await;

        let attachment = attachment.map(|a| {
            let url = storage::public_url(self.ctx.storage(), &a.path);
            (a, url)
        });

        Ok(MessageResponse::from(MessageWithDetails {
            message,
            sender,
            attachment,
            read_by: vec![],
        }))
    }

    /// List a room's messages, oldest first
    ///
    /// Each message is annotated with the readers it had when the page was
    /// built. Viewing is itself a read: every listed message from another
    /// sender that the viewer had not read yet gets a receipt after the
    /// page is assembled, so the viewer's own receipts first appear in the
    /// next listing.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        room_id: Snowflake,
        viewer_id: Snowflake,
        page: MessagePage,
    ) -> ServiceResult<Vec<MessageResponse>> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, viewer_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        let messages = self.ctx.message_repo().find_by_room(room_id, page).await?;
        let message_ids: Vec<Snowflake> = messages.iter().map(|m| m.id).collect();

        let attachments = self.ctx.message_repo().find_attachments(&message_ids).await?;
        let receipts = self.ctx.receipt_repo().find_by_messages(&message_ids).await?;

        let mut sender_ids: Vec<Snowflake> = messages.iter().map(|m| m.sender_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();
        let profiles = self.ctx.profile_repo().find_many(&sender_ids).await?;

        let responses = messages
            .into_iter()
            .map(|message| {
                let sender = profiles.iter().find(|p| p.id == message.sender_id).cloned();
                let attachment = attachments
                    .iter()
                    .find(|a| a.message_id == message.id)
                    .cloned()
                    .map(|a| {
                        let url = storage::public_url(self.ctx.storage(), &a.path);
                        (a, url)
                    });
                let read_by: Vec<Snowflake> = receipts
                    .iter()
                    .filter(|r| r.message_id == message.id)
                    .map(|r| r.user_id)
                    .collect();

                MessageResponse::from(MessageWithDetails {
                    message,
                    sender,
                    attachment,
                    read_by,
                })
            })
            .collect();

        // Eager read-on-view, after the annotation snapshot was taken
        let newly_read = self
            .ctx
            .receipt_repo()
            .mark_many(&message_ids, viewer_id)
            .await?;
        self.publish_receipts(room_id, viewer_id, &newly_read).await;

        Ok(responses)
    }

    /// Get a single message with its annotation
    #[instrument(skip(self))]
    pub async fn get_message(
        &self,
        room_id: Snowflake,
        message_id: Snowflake,
        viewer_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let room = self.find_room(room_id).await?;

        AccessService::new(self.ctx)
            .require(&room, viewer_id, RoomCapabilities::READ_MESSAGES)
            .await?;

        let message = self.find_room_message(room_id, message_id).await?;

        let attachment = self
            .ctx
            .message_repo()
            .find_attachments(&[message.id])
            .await?
            .into_iter()
            .next()
            .map(|a| {
                let url = storage::public_url(self.ctx.storage(), &a.path);
                (a, url)
            });

        let read_by: Vec<Snowflake> = self
            .ctx
            .receipt_repo()
            .find_by_messages(&[message.id])
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();

        let sender = self.ctx.profile_repo().find_by_id(message.sender_id).await?;

        Ok(MessageResponse::from(MessageWithDetails {
            message,
            sender,
            attachment,
            read_by,
        }))
    }

    /// Delete a message
    ///
    /// Only the sender may delete, and only softly: the row stays for
    /// audit but leaves every read path.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        room_id: Snowflake,
        message_id: Snowflake,
        requester_id: Snowflake,
    ) -> ServiceResult<()> {
        self.find_room(room_id).await?;
        let message = self.find_room_message(room_id, message_id).await?;

        if message.sender_id != requester_id {
            return Err(DomainError::NotMessageSender.into());
        }

        self.ctx.message_repo().delete(message_id).await?;

        info!(message_id = %message_id, room_id = %room_id, "Message deleted");

        let data = json!({
            "id": message_id.to_string(),
            "room_id": room_id.to_string(),
        });
        self.ctx
            .publisher()
            .publish_room_event("MESSAGE_DELETE", room_id, data)
            .await
            .ok();

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

    /// Fetch a message and verify it belongs to the room
    async fn find_room_message(
        &self,
        room_id: Snowflake,
        message_id: Snowflake,
    ) -> ServiceResult<Message> {
        let message = self
            .ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Message", message_id.to_string()))?;

        if message.room_id != room_id {
            return Err(ServiceError::not_found("Message", message_id.to_string()));
        }

        Ok(message)
    }

    /// Helper to publish MESSAGE_CREATE with the sender embedded
    async fn publish_message_create(
        &self,
        message: &Message,
        attachment: Option<&Attachment>,
        sender: Option<&Profile>,
    ) {
        let data = json!({
            "id": message.id.to_string(),
            "room_id": message.room_id.to_string(),
            "sender": {
                "id": message.sender_id.to_string(),
                "display_name": sender.map_or("Unknown", |p| p.display_name.as_str()),
                "avatar_path": sender.and_then(|p| p.avatar_path.as_deref()),
            },
            "content": message.content,
            "created_at": message.created_at.to_rfc3339(),
            "attachment": attachment.map(|a| json!({
                "id": a.id.to_string(),
                "filename": a.filename,
                "content_type": a.content_type,
                "size": a.size,
                "url": storage::public_url(self.ctx.storage(), &a.path),
            })),
        });

        self.ctx
            .publisher()
            .publish_room_event("MESSAGE_CREATE", message.room_id, data)
            .await
            .ok();
    }

    /// Helper to publish RECEIPT_CREATE for each newly marked message
    pub(super) async fn publish_receipts(
        &self,
        room_id: Snowflake,
        reader_id: Snowflake,
        message_ids: &[Snowflake],
    ) {
        for &message_id in message_ids {
            let data = json!({
                "message_id": message_id.to_string(),
                "room_id": room_id.to_string(),
                "user_id": reader_id.to_string(),
            });
            self.ctx
                .publisher()
                .publish_room_event("RECEIPT_CREATE", room_id, data)
                .await
                .ok();
        }
    }
}
