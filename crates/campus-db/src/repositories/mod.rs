//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in campus-core.
//! Each repository handles database operations for a specific domain entity.

mod connection;
mod error;
mod message;
mod participant;
mod profile;
mod receipt;
mod room;

pub use connection::PgConnectionRepository;
pub use message::PgMessageRepository;
pub use participant::PgParticipantRepository;
pub use profile::PgProfileRepository;
pub use receipt::PgReceiptRepository;
pub use room::PgRoomRepository;
