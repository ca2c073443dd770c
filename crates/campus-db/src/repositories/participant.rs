//! PostgreSQL implementation of ParticipantRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::Participant;
use campus_core::traits::{ParticipantRepository, RepoResult};
use campus_core::value_objects::Snowflake;

use crate::models::ParticipantModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ParticipantRepository
#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    /// Create a new PgParticipantRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    #[instrument(skip(self))]
    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM room_participants WHERE room_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(room_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>> {
        let result = sqlx::query_as::<_, ParticipantModel>(
            r"
            SELECT room_id, user_id, joined_at
            FROM room_participants
            WHERE room_id = $1 AND user_id = $2
            ",
        )
        .bind(room_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Participant::from))
    }

    #[instrument(skip(self))]
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<Participant>> {
        let results = sqlx::query_as::<_, ParticipantModel>(
            r"
            SELECT room_id, user_id, joined_at
            FROM room_participants
            WHERE room_id = $1
            ORDER BY joined_at
            ",
        )
        .bind(room_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Participant::from).collect())
    }

    #[instrument(skip(self))]
    async fn add(&self, participant: &Participant) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO room_participants (room_id, user_id, joined_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (room_id, user_id) DO NOTHING
            ",
        )
        .bind(participant.room_id.into_inner())
        .bind(participant.user_id.into_inner())
        .bind(participant.joined_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
