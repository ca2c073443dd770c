//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use campus_core::entities::RoomType;
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Profile Responses
// ============================================================================

/// Full profile response
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact profile for embedding in messages and participant lists
#[derive(Debug, Clone, Serialize)]
pub struct ProfileBrief {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
}

// ============================================================================
// Room Responses
// ============================================================================

/// Room response
#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Serialized lowercase: "campus", "open", "direct"
    pub room_type: RoomType,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Room participant response
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message response with its sender, optional attachment, and readers
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub room_id: String,
    pub sender: ProfileBrief,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentResponse>,
    /// User ids that have read this message; never contains the sender
    pub read_by: Vec<String>,
    /// Whether anyone besides the sender has read it
    pub read_by_other: bool,
}

/// Attachment response
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
}

/// Acknowledgement for a single explicit read mark
#[derive(Debug, Clone, Serialize)]
pub struct MarkReadResponse {
    /// False when the message was already read; the call still succeeded
    pub marked: bool,
}

/// Acknowledgement for a whole-room catch-up read
#[derive(Debug, Clone, Serialize)]
pub struct RoomReadResponse {
    pub marked_count: usize,
}

// ============================================================================
// Connection Responses
// ============================================================================

/// Connection request response
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResponse {
    pub id: String,
    pub requester: ProfileBrief,
    pub addressee: ProfileBrief,
    /// "pending", "accepted", or "declined"
    pub status: String,
    /// Direct room id, set once the request has been accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Typing Responses
// ============================================================================

/// One currently typing user
#[derive(Debug, Clone, Serialize)]
pub struct TypingUserResponse {
    pub user_id: String,
    pub display_name: String,
    pub started_at: DateTime<Utc>,
}

// ============================================================================
// File Responses
// ============================================================================

/// Stored file response returned by the upload endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoredFileResponse {
    pub path: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub url: String,
}

/// Temporary download URL response
#[derive(Debug, Clone, Serialize)]
pub struct TempUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
