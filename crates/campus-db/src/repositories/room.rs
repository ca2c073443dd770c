//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::{direct_pair_key, Room, RoomType};
use campus_core::error::DomainError;
use campus_core::traits::{RepoResult, RoomRepository};
use campus_core::value_objects::Snowflake;

use crate::models::RoomModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(
            r"
            SELECT id, name, room_type, created_by, pair_key, created_at
            FROM rooms
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn find_campus(&self) -> RepoResult<Option<Room>> {
        // The partial unique index guarantees at most one row matches.
        let result = sqlx::query_as::<_, RoomModel>(
            r"
            SELECT id, name, room_type, created_by, pair_key, created_at
            FROM rooms
            WHERE room_type = 0
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn find_direct(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(
            r"
            SELECT id, name, room_type, created_by, pair_key, created_at
            FROM rooms
            WHERE pair_key = $1
            ",
        )
        .bind(direct_pair_key(a, b))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>> {
        // Campus is visible to everyone; other rooms require membership.
        let results = sqlx::query_as::<_, RoomModel>(
            r"
            SELECT r.id, r.name, r.room_type, r.created_by, r.pair_key, r.created_at
            FROM rooms r
            WHERE r.room_type = 0
               OR EXISTS (
                    SELECT 1 FROM room_participants p
                    WHERE p.room_id = r.id AND p.user_id = $1
               )
            ORDER BY r.created_at DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Room::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, room: &Room) -> RepoResult<()> {
        let room_type = room.room_type;
        sqlx::query(
            r"
            INSERT INTO rooms (id, name, room_type, created_by, pair_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(room.id.into_inner())
        .bind(&room.name)
        .bind(room.room_type.as_i16())
        .bind(room.created_by.into_inner())
        .bind(&room.pair_key)
        .bind(room.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || match room_type {
                RoomType::Campus => DomainError::CampusRoomExists,
                _ => DomainError::DirectRoomExists,
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_with_participants(
        &self,
        room: &Room,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<()> {
        let room_type = room.room_type;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Room row first; participant rows ride the same transaction, so a
        // failure on either insert leaves no orphaned room behind.
        sqlx::query(
            r"
            INSERT INTO rooms (id, name, room_type, created_by, pair_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(room.id.into_inner())
        .bind(&room.name)
        .bind(room.room_type.as_i16())
        .bind(room.created_by.into_inner())
        .bind(&room.pair_key)
        .bind(room.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || match room_type {
                RoomType::Campus => DomainError::CampusRoomExists,
                _ => DomainError::DirectRoomExists,
            })
        })?;

        for user_id in [a, b] {
            sqlx::query(
                r"
                INSERT INTO room_participants (room_id, user_id, joined_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (room_id, user_id) DO NOTHING
                ",
            )
            .bind(room.id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}
