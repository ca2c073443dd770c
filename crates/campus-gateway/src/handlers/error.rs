//! Handler error types

use crate::protocol::CloseCode;
use campus_core::DomainError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Service error
    #[error("Service error: {0}")]
    ServiceError(#[from] campus_service::ServiceError),

    /// Domain error (from repositories)
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),

    /// Cache error
    #[error("Cache error: {0}")]
    CacheError(#[from] campus_cache::RedisPoolError),

    /// Pub/Sub subscription error
    #[error("Subscription error: {0}")]
    SubscriberError(#[from] campus_cache::SubscriberError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a close code
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::ServiceError(_)
            | Self::DomainError(_)
            | Self::CacheError(_)
            | Self::SubscriberError(_)
            | Self::Internal(_) => CloseCode::UnknownError,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
