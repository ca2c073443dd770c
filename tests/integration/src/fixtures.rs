//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A test identity, as the fronting proxy would assert it
///
/// Ids are derived from the clock so reruns against a shared database
/// never collide with rows from earlier runs.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub display_name: String,
}

impl TestUser {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        let id = chrono::Utc::now().timestamp_micros() as u64 + suffix;
        Self {
            id: id.to_string(),
            display_name: format!("Test User {suffix}"),
        }
    }

    pub fn named(display_name: &str) -> Self {
        let suffix = unique_suffix();
        let id = chrono::Utc::now().timestamp_micros() as u64 + suffix;
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Profile update request
#[derive(Debug, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
}

/// Open room creation request
#[derive(Debug, Serialize)]
pub struct CreateOpenRoomRequest {
    pub invitee_id: String,
    pub name: Option<String>,
}

impl CreateOpenRoomRequest {
    pub fn unique(invitee: &TestUser) -> Self {
        let suffix = unique_suffix();
        Self {
            invitee_id: invitee.id.clone(),
            name: Some(format!("Test Room {suffix}")),
        }
    }
}

/// Direct room request
#[derive(Debug, Serialize)]
pub struct OpenDirectRoomRequest {
    pub recipient_id: String,
}

impl OpenDirectRoomRequest {
    pub fn with(recipient: &TestUser) -> Self {
        Self {
            recipient_id: recipient.id.clone(),
        }
    }
}

/// Add participant request
#[derive(Debug, Serialize)]
pub struct AddParticipantRequest {
    pub user_id: String,
}

/// Send message request
#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
    pub attachment: Option<AttachmentMeta>,
}

impl SendMessageRequest {
    pub fn simple(content: &str) -> Self {
        Self {
            content: content.to_string(),
            attachment: None,
        }
    }

    pub fn with_attachment(content: &str, attachment: AttachmentMeta) -> Self {
        Self {
            content: content.to_string(),
            attachment: Some(attachment),
        }
    }
}

/// Attachment metadata referencing an uploaded file
#[derive(Debug, Serialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub path: String,
}

/// Connection request
#[derive(Debug, Serialize)]
pub struct SendConnectionRequest {
    pub addressee_id: String,
}

impl SendConnectionRequest {
    pub fn to(addressee: &TestUser) -> Self {
        Self {
            addressee_id: addressee.id.clone(),
        }
    }
}

/// Profile response
#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: String,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub avatar_path: Option<String>,
    pub created_at: String,
}

/// Brief profile embedded in other responses
#[derive(Debug, Deserialize)]
pub struct ProfileBrief {
    pub id: String,
    pub display_name: String,
    pub avatar_path: Option<String>,
}

/// Room response
#[derive(Debug, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub name: Option<String>,
    pub room_type: String,
    pub created_by: String,
    pub created_at: String,
}

/// Participant response
#[derive(Debug, Deserialize)]
pub struct ParticipantResponse {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: String,
}

/// Message response
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub room_id: String,
    pub sender: ProfileBrief,
    pub content: String,
    pub created_at: String,
    pub attachment: Option<AttachmentResponse>,
    pub read_by: Vec<String>,
    pub read_by_other: bool,
}

/// Attachment response
#[derive(Debug, Deserialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
}

/// Single message read marker response
#[derive(Debug, Deserialize)]
pub struct MarkReadResponse {
    pub marked: bool,
}

/// Room-wide read marker response
#[derive(Debug, Deserialize)]
pub struct RoomReadResponse {
    pub marked_count: u64,
}

/// Connection request response
#[derive(Debug, Deserialize)]
pub struct ConnectionResponse {
    pub id: String,
    pub requester: ProfileBrief,
    pub addressee: ProfileBrief,
    pub status: String,
    pub room_id: Option<String>,
    pub created_at: String,
}

/// Stored file response from the upload endpoint
#[derive(Debug, Deserialize)]
pub struct StoredFileResponse {
    pub path: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
}

/// Temporary download link response
#[derive(Debug, Deserialize)]
pub struct TempUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

/// Error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
