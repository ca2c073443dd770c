//! PostgreSQL implementation of ReceiptRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::ReadReceipt;
use campus_core::traits::{ReceiptRepository, RepoResult};
use campus_core::value_objects::Snowflake;

use crate::models::ReadReceiptModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ReceiptRepository
#[derive(Clone)]
pub struct PgReceiptRepository {
    pool: PgPool,
}

impl PgReceiptRepository {
    /// Create a new PgReceiptRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceiptRepository for PgReceiptRepository {
    #[instrument(skip(self))]
    async fn mark_read(&self, receipt: &ReadReceipt) -> RepoResult<bool> {
        // Duplicate reads hit the primary key and insert nothing; the caller
        // treats both outcomes as success.
        let result = sqlx::query(
            r"
            INSERT INTO read_receipts (message_id, user_id, read_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (message_id, user_id) DO NOTHING
            ",
        )
        .bind(receipt.message_id.into_inner())
        .bind(receipt.user_id.into_inner())
        .bind(receipt.read_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, message_ids))]
    async fn mark_many(
        &self,
        message_ids: &[Snowflake],
        user_id: Snowflake,
    ) -> RepoResult<Vec<Snowflake>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = message_ids.iter().map(|s| s.into_inner()).collect();

        // Same shape as mark_room_read, scoped to the listed page. Routing
        // the ids through the messages table keeps own and deleted messages
        // out even if the caller passes them.
        let results = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO read_receipts (message_id, user_id, read_at)
            SELECT m.id, $2, NOW()
            FROM messages m
            WHERE m.id = ANY($1)
              AND m.sender_id <> $2
              AND m.deleted_at IS NULL
            ON CONFLICT (message_id, user_id) DO NOTHING
            RETURNING message_id
            ",
        )
        .bind(&ids)
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn mark_room_read(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<Snowflake>> {
        // One statement covers the whole room: receipts for other senders'
        // live messages, skipping rows that already exist.
        let results = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO read_receipts (message_id, user_id, read_at)
            SELECT m.id, $2, NOW()
            FROM messages m
            WHERE m.room_id = $1
              AND m.sender_id <> $2
              AND m.deleted_at IS NULL
            ON CONFLICT (message_id, user_id) DO NOTHING
            RETURNING message_id
            ",
        )
        .bind(room_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self, message_ids))]
    async fn find_by_messages(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<ReadReceipt>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = message_ids.iter().map(|s| s.into_inner()).collect();

        let results = sqlx::query_as::<_, ReadReceiptModel>(
            r"
            SELECT message_id, user_id, read_at
            FROM read_receipts
            WHERE message_id = ANY($1)
            ORDER BY read_at
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ReadReceipt::from).collect())
    }
}
