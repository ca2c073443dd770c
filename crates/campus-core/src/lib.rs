//! # campus-core
//!
//! Domain layer containing entities, value objects, the room access policy,
//! and repository traits. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    direct_pair_key, Attachment, ConnectionRequest, ConnectionStatus, Message, Participant,
    Profile, ReadReceipt, Room, RoomType,
};
pub use error::DomainError;
pub use policy::AccessFacts;
pub use traits::{
    ConnectionRepository, MessagePage, MessageRepository, ParticipantRepository,
    ProfileRepository, ReceiptRepository, RepoResult, RoomRepository,
};
pub use value_objects::{RoomCapabilities, Snowflake, SnowflakeGenerator, SnowflakeParseError};
