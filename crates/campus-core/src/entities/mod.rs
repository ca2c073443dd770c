//! Domain entities - core business objects

mod connection;
mod message;
mod participant;
mod profile;
mod receipt;
mod room;

pub use connection::{ConnectionRequest, ConnectionStatus};
pub use message::{Attachment, Message};
pub use participant::Participant;
pub use profile::Profile;
pub use receipt::ReadReceipt;
pub use room::{direct_pair_key, Room, RoomType};
