//! Service context - dependency container for services
//!
//! Holds all repositories, cache stores, and other dependencies needed by services.

use std::sync::Arc;

use campus_cache::{Publisher, SharedRedisPool, TempUrlStore, TypingStore};
use campus_common::config::{ChatConfig, StorageConfig};
use campus_core::traits::{
    ConnectionRepository, MessageRepository, ParticipantRepository, ProfileRepository,
    ReceiptRepository, RoomRepository,
};
use campus_core::SnowflakeGenerator;
use campus_db::PgPool;

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - Redis-backed typing presence and temporary URL stores
/// - Redis pub/sub for events
/// - Snowflake generator for ID generation
/// - Chat and storage limits from configuration
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool
    pool: PgPool,

    // Redis pool
    redis_pool: SharedRedisPool,

    // Repositories
    profile_repo: Arc<dyn ProfileRepository>,
    room_repo: Arc<dyn RoomRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    message_repo: Arc<dyn MessageRepository>,
    receipt_repo: Arc<dyn ReceiptRepository>,
    connection_repo: Arc<dyn ConnectionRepository>,

    // Cache stores
    typing_store: TypingStore,
    temp_url_store: TempUrlStore,

    // Pub/Sub
    publisher: Publisher,

    // Services
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Limits
    chat: ChatConfig,
    storage: StorageConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        redis_pool: SharedRedisPool,
        profile_repo: Arc<dyn ProfileRepository>,
        room_repo: Arc<dyn RoomRepository>,
        participant_repo: Arc<dyn ParticipantRepository>,
        message_repo: Arc<dyn MessageRepository>,
        receipt_repo: Arc<dyn ReceiptRepository>,
        connection_repo: Arc<dyn ConnectionRepository>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        chat: ChatConfig,
        storage: StorageConfig,
    ) -> Self {
        // Clone the inner RedisPool from the Arc
        let inner_pool = (*redis_pool).clone();
        let typing_store = TypingStore::new(inner_pool.clone());
        let temp_url_store = TempUrlStore::with_ttl(inner_pool.clone(), storage.temp_url_ttl_seconds);
        let publisher = Publisher::new(inner_pool);

        Self {
            pool,
            redis_pool,
            profile_repo,
            room_repo,
            participant_repo,
            message_repo,
            receipt_repo,
            connection_repo,
            typing_store,
            temp_url_store,
            publisher,
            snowflake_generator,
            chat,
            storage,
        }
    }

    // === Pools ===

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the Redis connection pool
    pub fn redis_pool(&self) -> &SharedRedisPool {
        &self.redis_pool
    }

    // === Repositories ===

    /// Get the profile repository
    pub fn profile_repo(&self) -> &dyn ProfileRepository {
        self.profile_repo.as_ref()
    }

    /// Get the room repository
    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    /// Get the participant repository
    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    /// Get the message repository
    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    /// Get the read receipt repository
    pub fn receipt_repo(&self) -> &dyn ReceiptRepository {
        self.receipt_repo.as_ref()
    }

    /// Get the connection request repository
    pub fn connection_repo(&self) -> &dyn ConnectionRepository {
        self.connection_repo.as_ref()
    }

    // === Cache Stores ===

    /// Get the typing presence store
    pub fn typing_store(&self) -> &TypingStore {
        &self.typing_store
    }

    /// Get the temporary URL store
    pub fn temp_url_store(&self) -> &TempUrlStore {
        &self.temp_url_store
    }

    // === Pub/Sub ===

    /// Get the Redis pub/sub publisher
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    // === Services ===

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> campus_core::Snowflake {
        self.snowflake_generator.generate()
    }

    // === Limits ===

    /// Get the chat limits
    pub fn chat(&self) -> &ChatConfig {
        &self.chat
    }

    /// Get the storage limits
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("redis_pool", &"SharedRedisPool")
            .field("repositories", &"...")
            .field("cache_stores", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    room_repo: Option<Arc<dyn RoomRepository>>,
    participant_repo: Option<Arc<dyn ParticipantRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    receipt_repo: Option<Arc<dyn ReceiptRepository>>,
    connection_repo: Option<Arc<dyn ConnectionRepository>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    chat: Option<ChatConfig>,
    storage: Option<StorageConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            redis_pool: None,
            profile_repo: None,
            room_repo: None,
            participant_repo: None,
            message_repo: None,
            receipt_repo: None,
            connection_repo: None,
            snowflake_generator: None,
            chat: None,
            storage: None,
        }
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    pub fn participant_repo(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participant_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn receipt_repo(mut self, repo: Arc<dyn ReceiptRepository>) -> Self {
        self.receipt_repo = Some(repo);
        self
    }

    pub fn connection_repo(mut self, repo: Arc<dyn ConnectionRepository>) -> Self {
        self.connection_repo = Some(repo);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.pool.ok_or_else(|| super::error::ServiceError::validation("pool is required"))?,
            self.redis_pool.ok_or_else(|| super::error::ServiceError::validation("redis_pool is required"))?,
            self.profile_repo.ok_or_else(|| super::error::ServiceError::validation("profile_repo is required"))?,
            self.room_repo.ok_or_else(|| super::error::ServiceError::validation("room_repo is required"))?,
            self.participant_repo.ok_or_else(|| super::error::ServiceError::validation("participant_repo is required"))?,
            self.message_repo.ok_or_else(|| super::error::ServiceError::validation("message_repo is required"))?,
            self.receipt_repo.ok_or_else(|| super::error::ServiceError::validation("receipt_repo is required"))?,
            self.connection_repo.ok_or_else(|| super::error::ServiceError::validation("connection_repo is required"))?,
            self.snowflake_generator.ok_or_else(|| super::error::ServiceError::validation("snowflake_generator is required"))?,
            self.chat.ok_or_else(|| super::error::ServiceError::validation("chat config is required"))?,
            self.storage.ok_or_else(|| super::error::ServiceError::validation("storage config is required"))?,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
