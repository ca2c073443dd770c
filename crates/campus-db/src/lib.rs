//! # campus-db
//!
//! PostgreSQL persistence for the campus chat domain, built on SQLx.
//!
//! Each repository trait from `campus-core` has one `Pg*` implementation
//! here. Row structs live in [`models`], entity conversion in [`mappers`],
//! and pool setup plus embedded migrations in [`pool`].
//!
//! ```rust,ignore
//! use campus_db::{run_migrations, DatabaseConfig, PgRoomRepository};
//! use campus_core::traits::RoomRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = DatabaseConfig::from_env().connect().await?;
//!     run_migrations(&pool).await?;
//!     let rooms = PgRoomRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgConnectionRepository, PgMessageRepository, PgParticipantRepository, PgProfileRepository,
    PgReceiptRepository, PgRoomRepository,
};
