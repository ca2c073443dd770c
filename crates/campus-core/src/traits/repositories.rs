//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer provides
//! the implementation.

use async_trait::async_trait;

use crate::entities::{
    Attachment, ConnectionRequest, ConnectionStatus, Message, Participant, Profile, ReadReceipt,
    Room,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find profile by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Profile>>;

    /// Batch fetch profiles (for name/avatar display)
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Profile>>;

    /// Create a new profile
    async fn create(&self, profile: &Profile) -> RepoResult<()>;

    /// Update an existing profile
    async fn update(&self, profile: &Profile) -> RepoResult<()>;
}

// ============================================================================
// Room Repository
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find room by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>>;

    /// Find the campus room, if it has been created yet
    async fn find_campus(&self) -> RepoResult<Option<Room>>;

    /// Find the direct room for an unordered user pair
    async fn find_direct(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Room>>;

    /// Rooms visible in the user's sidebar: their memberships
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>>;

    /// Insert a room row
    ///
    /// Campus inserts hitting the singleton index fail with
    /// `CampusRoomExists`; direct inserts hitting the pair index fail with
    /// `DirectRoomExists`.
    async fn create(&self, room: &Room) -> RepoResult<()>;

    /// Insert a room and both initial participant rows in one transaction
    ///
    /// Serves direct and open rooms, which both start with exactly two
    /// members. Room insert runs first; participant failures roll the room
    /// back, so an orphaned room can never be observed. Unique violations
    /// map the same way as [`RoomRepository::create`].
    async fn create_with_participants(
        &self,
        room: &Room,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<()>;
}

// ============================================================================
// Participant Repository
// ============================================================================

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Check membership - the fact the access policy keys on
    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Find a single membership row
    async fn find(&self, room_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<Participant>>;

    /// List a room's participants in join order
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<Participant>>;

    /// Idempotent membership insert (duplicate is a no-op)
    async fn add(&self, participant: &Participant) -> RepoResult<()>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination for message listing, ascending by creation time
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePage {
    /// Resume after this message id
    pub after: Option<Snowflake>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID (excluding deleted)
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// List a room's messages ascending by creation time
    async fn find_by_room(&self, room_id: Snowflake, page: MessagePage)
        -> RepoResult<Vec<Message>>;

    /// Insert a message and its optional attachment in one transaction
    async fn create(&self, message: &Message, attachment: Option<&Attachment>) -> RepoResult<()>;

    /// Soft delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Attachments for a batch of messages
    async fn find_attachments(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Attachment>>;

    /// Single attachment together with the room its message lives in,
    /// skipping deleted messages. The room id lets callers run the access
    /// check before handing out the file.
    async fn find_attachment(&self, id: Snowflake)
        -> RepoResult<Option<(Attachment, Snowflake)>>;
}

// ============================================================================
// Read Receipt Repository
// ============================================================================

#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Idempotent receipt insert
    ///
    /// Returns `true` if the row was newly inserted, `false` if it already
    /// existed (duplicate insert is success, never an error).
    async fn mark_read(&self, receipt: &ReadReceipt) -> RepoResult<bool>;

    /// Eager read-on-view for a listed page: insert receipts for the given
    /// messages where authored by someone else and not yet read by this
    /// user, in one batched statement. Returns the ids of messages that
    /// were newly marked.
    async fn mark_many(
        &self,
        message_ids: &[Snowflake],
        user_id: Snowflake,
    ) -> RepoResult<Vec<Snowflake>>;

    /// Catch-up variant of [`ReceiptRepository::mark_many`] covering every
    /// live message in the room.
    async fn mark_room_read(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Snowflake>>;

    /// Receipts for a batch of messages (for list annotation)
    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<ReadReceipt>>;
}

// ============================================================================
// Connection Request Repository
// ============================================================================

#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// Find request by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ConnectionRequest>>;

    /// Find the latest request between an unordered pair
    async fn find_by_pair(&self, pair_key: &str) -> RepoResult<Option<ConnectionRequest>>;

    /// Requests where the user is requester or addressee
    async fn find_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<ConnectionRequest>>;

    /// Insert a request; a live duplicate for the pair fails with
    /// `ConnectionRequestExists`
    async fn create(&self, request: &ConnectionRequest) -> RepoResult<()>;

    /// Update request status
    async fn update_status(&self, id: Snowflake, status: ConnectionStatus) -> RepoResult<()>;
}
