//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    AddParticipantRequest, AttachmentMeta, CreateOpenRoomRequest, OpenDirectRoomRequest,
    SendConnectionRequest, SendMessageRequest, UpdateProfileRequest,
};

// Re-export commonly used response types
pub use responses::{
    ApiResponse, AttachmentResponse, ConnectionResponse, HealthChecks, HealthResponse,
    MarkReadResponse, MessageResponse, ParticipantResponse, ProfileBrief, ProfileResponse,
    ReadinessResponse, RoomReadResponse, RoomResponse, StoredFileResponse, TempUrlResponse,
    TypingUserResponse,
};

// Re-export mappers and helper structs
pub use mappers::{ConnectionWithProfiles, MessageWithDetails, ParticipantWithProfile};
