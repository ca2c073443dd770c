//! Application-level error type.
//!
//! `AppError` is where everything above the domain layer converges:
//! database, cache and storage failures, configuration problems, and
//! `DomainError` values bubbling up from campus-core. Each error knows
//! its HTTP status and a stable machine-readable code; the REST layer
//! renders those without inspecting variants.

use campus_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Infrastructure failures, all opaque 500s to clients
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// HTTP status and stable error code, as one lookup
    #[must_use]
    pub fn http(&self) -> (u16, &'static str) {
        match self {
            Self::Validation(_) => (400, "VALIDATION_ERROR"),
            Self::NotFound(_) => (404, "NOT_FOUND"),
            Self::Conflict(_) => (409, "CONFLICT"),
            Self::Database(_) => (500, "DATABASE_ERROR"),
            Self::Cache(_) => (500, "CACHE_ERROR"),
            Self::Storage(_) => (500, "STORAGE_ERROR"),
            Self::Config(_) => (500, "CONFIG_ERROR"),
            Self::Internal(_) => (500, "INTERNAL_ERROR"),
            Self::Domain(e) => (domain_status(e), e.code()),
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.http().0
    }

    /// Stable machine-readable code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        self.http().1
    }
}

// campus-core knows nothing about HTTP; its category predicates are
// mapped to statuses here, in one place for both REST and gateway use.
fn domain_status(e: &DomainError) -> u16 {
    if e.is_not_found() {
        404
    } else if e.is_authorization() {
        403
    } else if e.is_validation() {
        400
    } else if e.is_conflict() {
        409
    } else {
        500
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
