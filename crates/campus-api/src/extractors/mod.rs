//! Axum extractors for request handling
//!
//! Custom extractors for caller identity, validation, and pagination.

mod auth;
mod pagination;
mod validated;

pub use auth::AuthUser;
pub use pagination::{Pagination, PaginationParams};
pub use validated::ValidatedJson;
