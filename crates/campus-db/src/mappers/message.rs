//! Message and Attachment entity <-> model mappers

use campus_core::entities::{Attachment, Message};
use campus_core::value_objects::Snowflake;

use crate::models::{AttachmentModel, MessageModel};

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            room_id: Snowflake::new(model.room_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

/// Convert AttachmentModel to Attachment entity
impl From<AttachmentModel> for Attachment {
    fn from(model: AttachmentModel) -> Self {
        Attachment {
            id: Snowflake::new(model.id),
            message_id: Snowflake::new(model.message_id),
            filename: model.filename,
            content_type: model.content_type,
            size: model.size,
            path: model.path,
        }
    }
}
