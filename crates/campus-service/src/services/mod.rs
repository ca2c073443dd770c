//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod access;
pub mod connection;
pub mod context;
pub mod error;
pub mod message;
pub mod profile;
pub mod receipt;
pub mod room;
pub mod storage;
pub mod typing;

// Re-export all services for convenience
pub use access::AccessService;
pub use connection::ConnectionService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use profile::ProfileService;
pub use receipt::ReceiptService;
pub use room::RoomService;
pub use storage::StorageService;
pub use typing::TypingService;
