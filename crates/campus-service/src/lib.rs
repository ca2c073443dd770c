//! # campus-service
//!
//! Application layer containing business logic, services, and DTOs.

pub mod dto;
pub mod services;

pub use dto::{
    AddParticipantRequest, ApiResponse, AttachmentMeta, AttachmentResponse, ConnectionResponse,
    CreateOpenRoomRequest, HealthResponse, MarkReadResponse, MessageResponse,
    OpenDirectRoomRequest, ParticipantResponse, ProfileBrief, ProfileResponse, ReadinessResponse,
    RoomReadResponse, RoomResponse, SendConnectionRequest, SendMessageRequest, StoredFileResponse,
    TempUrlResponse, TypingUserResponse, UpdateProfileRequest,
};
pub use services::{
    AccessService, ConnectionService, MessageService, ProfileService, ReceiptService,
    RoomService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    StorageService, TypingService,
};
