//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use campus_cache::TypingData;
use campus_core::entities::{
    Attachment, ConnectionRequest, ConnectionStatus, Message, Participant, Profile, Room,
};
use campus_core::Snowflake;

use super::responses::{
    AttachmentResponse, ConnectionResponse, MessageResponse, ParticipantResponse, ProfileBrief,
    ProfileResponse, RoomResponse, TypingUserResponse,
};

/// Display name shown when a profile row is missing
const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

// ============================================================================
// Profile Mappers
// ============================================================================

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            display_name: profile.display_name.clone(),
            department: profile.department.clone(),
            bio: profile.bio.clone(),
            skills: profile.skills.clone(),
            avatar_path: profile.avatar_path.clone(),
            created_at: profile.created_at,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self::from(&profile)
    }
}

impl From<&Profile> for ProfileBrief {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            display_name: profile.display_name.clone(),
            avatar_path: profile.avatar_path.clone(),
        }
    }
}

impl From<Profile> for ProfileBrief {
    fn from(profile: Profile) -> Self {
        Self::from(&profile)
    }
}

impl ProfileBrief {
    /// Fallback brief for a user whose profile row is missing
    pub fn unknown(user_id: Snowflake) -> Self {
        Self {
            id: user_id.to_string(),
            display_name: UNKNOWN_DISPLAY_NAME.to_string(),
            avatar_path: None,
        }
    }

    /// Brief from an optional profile, falling back to [`ProfileBrief::unknown`]
    pub fn from_option(user_id: Snowflake, profile: Option<&Profile>) -> Self {
        profile.map_or_else(|| Self::unknown(user_id), Self::from)
    }
}

// ============================================================================
// Room Mappers
// ============================================================================

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.to_string(),
            name: room.name.clone(),
            room_type: room.room_type,
            created_by: room.created_by.to_string(),
            created_at: room.created_at,
        }
    }
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self::from(&room)
    }
}

/// Helper struct for creating ParticipantResponse
pub struct ParticipantWithProfile {
    pub participant: Participant,
    pub profile: Option<Profile>,
}

impl From<ParticipantWithProfile> for ParticipantResponse {
    fn from(pwp: ParticipantWithProfile) -> Self {
        let display_name = pwp
            .profile
            .map_or_else(|| UNKNOWN_DISPLAY_NAME.to_string(), |p| p.display_name);
        Self {
            user_id: pwp.participant.user_id.to_string(),
            display_name,
            joined_at: pwp.participant.joined_at,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

/// Helper struct for creating MessageResponse with all related data
pub struct MessageWithDetails {
    pub message: Message,
    pub sender: Option<Profile>,
    /// Attachment paired with its resolved public URL
    pub attachment: Option<(Attachment, String)>,
    pub read_by: Vec<Snowflake>,
}

impl From<MessageWithDetails> for MessageResponse {
    fn from(details: MessageWithDetails) -> Self {
        let sender = ProfileBrief::from_option(details.message.sender_id, details.sender.as_ref());
        // Receipts never include the sender, so any reader counts as "other"
        let read_by_other = !details.read_by.is_empty();
        Self {
            id: details.message.id.to_string(),
            room_id: details.message.room_id.to_string(),
            sender,
            content: details.message.content,
            created_at: details.message.created_at,
            attachment: details
                .attachment
                .map(|(attachment, url)| AttachmentResponse::with_url(&attachment, url)),
            read_by: details.read_by.iter().map(ToString::to_string).collect(),
            read_by_other,
        }
    }
}

impl AttachmentResponse {
    /// Build the response with a URL resolved by the storage layer
    pub fn with_url(attachment: &Attachment, url: impl Into<String>) -> Self {
        Self {
            id: attachment.id.to_string(),
            filename: attachment.filename.clone(),
            content_type: attachment.content_type.clone(),
            size: attachment.size,
            url: url.into(),
        }
    }
}

// ============================================================================
// Connection Mappers
// ============================================================================

/// Helper struct for creating ConnectionResponse
pub struct ConnectionWithProfiles {
    pub request: ConnectionRequest,
    pub requester: Option<Profile>,
    pub addressee: Option<Profile>,
    pub room_id: Option<Snowflake>,
}

impl From<ConnectionWithProfiles> for ConnectionResponse {
    fn from(cwp: ConnectionWithProfiles) -> Self {
        Self {
            id: cwp.request.id.to_string(),
            requester: ProfileBrief::from_option(cwp.request.requester_id, cwp.requester.as_ref()),
            addressee: ProfileBrief::from_option(cwp.request.addressee_id, cwp.addressee.as_ref()),
            status: status_label(cwp.request.status).to_string(),
            room_id: cwp.room_id.map(|id| id.to_string()),
            created_at: cwp.request.created_at,
        }
    }
}

fn status_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Pending => "pending",
        ConnectionStatus::Accepted => "accepted",
        ConnectionStatus::Declined => "declined",
    }
}

// ============================================================================
// Typing Mappers
// ============================================================================

impl From<TypingData> for TypingUserResponse {
    fn from(typing: TypingData) -> Self {
        Self {
            user_id: typing.user_id.to_string(),
            display_name: typing.display_name,
            started_at: chrono::DateTime::from_timestamp(typing.started_at, 0)
                .unwrap_or_default(),
        }
    }
}
