//! Repository traits (ports) for the persistence layer

mod repositories;

pub use repositories::{
    ConnectionRepository, MessagePage, MessageRepository, ParticipantRepository,
    ProfileRepository, ReceiptRepository, RepoResult, RoomRepository,
};
