//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::{Attachment, Message};
use campus_core::traits::{MessagePage, MessageRepository, RepoResult};
use campus_core::value_objects::Snowflake;

use crate::models::{AttachmentModel, MessageModel};

use super::error::{map_db_error, message_not_found};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, room_id, sender_id, content, created_at, deleted_at
            FROM messages
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn find_by_room(
        &self,
        room_id: Snowflake,
        page: MessagePage,
    ) -> RepoResult<Vec<Message>> {
        let limit = page.limit.clamp(1, 100);

        // Ascending order so readers always see a conversation top to bottom;
        // snowflake ids order identically to creation time.
        let results = match page.after {
            Some(after) => {
                sqlx::query_as::<_, MessageModel>(
                    r"
                    SELECT id, room_id, sender_id, content, created_at, deleted_at
                    FROM messages
                    WHERE room_id = $1 AND id > $2 AND deleted_at IS NULL
                    ORDER BY id ASC
                    LIMIT $3
                    ",
                )
                .bind(room_id.into_inner())
                .bind(after.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MessageModel>(
                    r"
                    SELECT id, room_id, sender_id, content, created_at, deleted_at
                    FROM messages
                    WHERE room_id = $1 AND deleted_at IS NULL
                    ORDER BY id ASC
                    LIMIT $2
                    ",
                )
                .bind(room_id.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, attachment))]
    async fn create(&self, message: &Message, attachment: Option<&Attachment>) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO messages (id, room_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.room_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if let Some(att) = attachment {
            sqlx::query(
                r"
                INSERT INTO attachments (id, message_id, filename, content_type, size, path, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, NOW())
                ",
            )
            .bind(att.id.into_inner())
            .bind(att.message_id.into_inner())
            .bind(&att.filename)
            .bind(&att.content_type)
            .bind(att.size)
            .bind(&att.path)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self, message_ids))]
    async fn find_attachments(&self, message_ids: &[Snowflake]) -> RepoResult<Vec<Attachment>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = message_ids.iter().map(|s| s.into_inner()).collect();

        let results = sqlx::query_as::<_, AttachmentModel>(
            r"
            SELECT id, message_id, filename, content_type, size, path, created_at
            FROM attachments
            WHERE message_id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Attachment::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_attachment(
        &self,
        id: Snowflake,
    ) -> RepoResult<Option<(Attachment, Snowflake)>> {
        // Joining through messages drops attachments of deleted messages.
        let result = sqlx::query_as::<_, AttachmentWithRoomModel>(
            r"
            SELECT a.id, a.message_id, a.filename, a.content_type, a.size, a.path,
                   a.created_at, m.room_id
            FROM attachments a
            JOIN messages m ON m.id = a.message_id
            WHERE a.id = $1 AND m.deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(|row| {
            let room_id = Snowflake::new(row.room_id);
            (Attachment::from(row.attachment), room_id)
        }))
    }
}

/// Attachment row joined with its message's room id
#[derive(sqlx::FromRow)]
struct AttachmentWithRoomModel {
    #[sqlx(flatten)]
    attachment: AttachmentModel,
    room_id: i64,
}
