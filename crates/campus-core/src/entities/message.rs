//! Message entity - a chat message with an optional attachment

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Message entity
///
/// Immutable once sent except for deletion by its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(id: Snowflake, room_id: Snowflake, sender_id: Snowflake, content: String) -> Self {
        Self {
            id,
            room_id,
            sender_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Check if the content is blank
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Truncated content preview for notifications
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }
}

/// Attachment metadata, at most one per message
///
/// The bytes themselves live in object storage under `path`; URLs are
/// derived by the storage layer, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    pub message_id: Snowflake,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub path: String,
}

impl Attachment {
    pub fn new(
        id: Snowflake,
        message_id: Snowflake,
        filename: String,
        content_type: String,
        size: i64,
        path: String,
    ) -> Self {
        Self {
            id,
            message_id,
            filename,
            content_type,
            size,
            path,
        }
    }

    /// Check if the attachment is an image
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Placeholder content stored when a message carries only a file
    pub fn placeholder_content(&self) -> String {
        format!("[file] {}", self.filename)
    }
}
