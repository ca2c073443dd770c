//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate`. Message content
//! and attachment limits are deliberately not field rules here; the service
//! layer checks them so each violation keeps its own error code.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Profile Requests
// ============================================================================

/// Update current user's profile request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    /// Replaces the existing skill list when present
    pub skills: Option<Vec<String>>,

    /// Storage path of the avatar, or null to remove
    pub avatar_path: Option<String>,
}

// ============================================================================
// Room Requests
// ============================================================================

/// Create an open room with an initial invitee
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOpenRoomRequest {
    /// Initial invitee user ID (Snowflake as string)
    pub invitee_id: String,

    #[validate(length(min = 1, max = 100, message = "Room name must be 1-100 characters"))]
    pub name: Option<String>,
}

/// Open (or return the existing) direct room with another user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OpenDirectRoomRequest {
    /// Recipient user ID (Snowflake as string)
    pub recipient_id: String,
}

/// Add a participant to a room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddParticipantRequest {
    /// User ID to add (Snowflake as string)
    pub user_id: String,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Attachment metadata referencing a previously uploaded file
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    /// Storage path returned by the upload endpoint
    pub path: String,
}

/// Send message request
///
/// `content` may be empty when an attachment is present; the stored
/// message then carries a placeholder derived from the filename.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,

    pub attachment: Option<AttachmentMeta>,
}

// ============================================================================
// Connection Requests
// ============================================================================

/// Send a connection request to another user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendConnectionRequest {
    /// Addressee user ID (Snowflake as string)
    pub addressee_id: String,
}
