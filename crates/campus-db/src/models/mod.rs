//! Database models - SQLx-compatible structs for PostgreSQL tables

mod connection;
mod message;
mod profile;
mod receipt;
mod room;

pub use connection::ConnectionRequestModel;
pub use message::{AttachmentModel, MessageModel};
pub use profile::ProfileModel;
pub use receipt::ReadReceiptModel;
pub use room::{ParticipantModel, RoomModel};
