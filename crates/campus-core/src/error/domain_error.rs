//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Profile not found: {0}")]
    ProfileNotFound(Snowflake),

    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Connection request not found: {0}")]
    ConnectionRequestNotFound(Snowflake),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Attachment type not allowed: {content_type}")]
    AttachmentTypeNotAllowed { content_type: String },

    #[error("Attachment too large: max {max_bytes} bytes")]
    AttachmentTooLarge { max_bytes: u64 },

    #[error("Message needs content or an attachment")]
    EmptyMessage,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    /// Generic policy denial; deliberately carries no reason
    #[error("Not allowed")]
    AccessDenied,

    #[error("Not the message sender")]
    NotMessageSender,

    #[error("Not the request addressee")]
    NotRequestAddressee,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Direct room already exists for this pair")]
    DirectRoomExists,

    #[error("Campus room already exists")]
    CampusRoomExists,

    #[error("Connection request already exists for this pair")]
    ConnectionRequestExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot open a direct room with yourself")]
    SelfDirectRoom,

    #[error("Cannot send a connection request to yourself")]
    SelfConnectionRequest,

    #[error("Cannot mark your own message as read")]
    OwnMessageReceipt,

    #[error("Connection request is not pending")]
    RequestNotPending,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ProfileNotFound(_) => "UNKNOWN_PROFILE",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ConnectionRequestNotFound(_) => "UNKNOWN_REQUEST",
            Self::AttachmentNotFound(_) => "UNKNOWN_ATTACHMENT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::AttachmentTypeNotAllowed { .. } => "ATTACHMENT_TYPE_NOT_ALLOWED",
            Self::AttachmentTooLarge { .. } => "ATTACHMENT_TOO_LARGE",
            Self::EmptyMessage => "EMPTY_MESSAGE",

            // Authorization
            Self::AccessDenied => "ACCESS_DENIED",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",
            Self::NotRequestAddressee => "NOT_REQUEST_ADDRESSEE",

            // Conflict
            Self::DirectRoomExists => "DIRECT_ROOM_EXISTS",
            Self::CampusRoomExists => "CAMPUS_ROOM_EXISTS",
            Self::ConnectionRequestExists => "REQUEST_EXISTS",

            // Business Rules
            Self::SelfDirectRoom => "SELF_DIRECT_ROOM",
            Self::SelfConnectionRequest => "SELF_REQUEST",
            Self::OwnMessageReceipt => "OWN_MESSAGE_RECEIPT",
            Self::RequestNotPending => "REQUEST_NOT_PENDING",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound(_)
                | Self::RoomNotFound(_)
                | Self::MessageNotFound(_)
                | Self::ConnectionRequestNotFound(_)
                | Self::AttachmentNotFound(_)
        )
    }

    /// Check if this is a validation error
    ///
    /// Business rule violations (self-targeted requests, own-message
    /// receipts) count: the request was well formed but asks for
    /// something the rules never allow.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::ContentTooLong { .. }
                | Self::AttachmentTypeNotAllowed { .. }
                | Self::AttachmentTooLarge { .. }
                | Self::EmptyMessage
                | Self::SelfDirectRoom
                | Self::SelfConnectionRequest
                | Self::OwnMessageReceipt
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::NotMessageSender | Self::NotRequestAddressee
        )
    }

    /// Check if this is a conflict error
    ///
    /// Acting on a request that already left the pending state is a
    /// conflict with its current state, not a malformed request.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DirectRoomExists
                | Self::CampusRoomExists
                | Self::ConnectionRequestExists
                | Self::RequestNotPending
        )
    }

    /// Check if this wraps an infrastructure failure (retry may help)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::CacheError(_) | Self::StorageError(_)
        )
    }
}
