//! PostgreSQL implementation of ConnectionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::{ConnectionRequest, ConnectionStatus};
use campus_core::error::DomainError;
use campus_core::traits::{ConnectionRepository, RepoResult};
use campus_core::value_objects::Snowflake;

use crate::models::ConnectionRequestModel;

use super::error::{map_db_error, map_unique_violation, request_not_found};

/// PostgreSQL implementation of ConnectionRepository
#[derive(Clone)]
pub struct PgConnectionRepository {
    pool: PgPool,
}

impl PgConnectionRepository {
    /// Create a new PgConnectionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionRepository for PgConnectionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ConnectionRequest>> {
        let result = sqlx::query_as::<_, ConnectionRequestModel>(
            r"
            SELECT id, requester_id, addressee_id, status, pair_key, created_at, updated_at
            FROM connection_requests
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ConnectionRequest::from))
    }

    #[instrument(skip(self))]
    async fn find_by_pair(&self, pair_key: &str) -> RepoResult<Option<ConnectionRequest>> {
        let result = sqlx::query_as::<_, ConnectionRequestModel>(
            r"
            SELECT id, requester_id, addressee_id, status, pair_key, created_at, updated_at
            FROM connection_requests
            WHERE pair_key = $1
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(pair_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ConnectionRequest::from))
    }

    #[instrument(skip(self))]
    async fn find_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<ConnectionRequest>> {
        let results = sqlx::query_as::<_, ConnectionRequestModel>(
            r"
            SELECT id, requester_id, addressee_id, status, pair_key, created_at, updated_at
            FROM connection_requests
            WHERE requester_id = $1 OR addressee_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ConnectionRequest::from).collect())
    }

    #[instrument(skip(self, request))]
    async fn create(&self, request: &ConnectionRequest) -> RepoResult<()> {
        // The partial unique index on pair_key covers pending and accepted
        // rows, so only a declined history permits a fresh request.
        sqlx::query(
            r"
            INSERT INTO connection_requests
                (id, requester_id, addressee_id, status, pair_key, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(request.id.into_inner())
        .bind(request.requester_id.into_inner())
        .bind(request.addressee_id.into_inner())
        .bind(request.status.as_i16())
        .bind(&request.pair_key)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ConnectionRequestExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: Snowflake, status: ConnectionStatus) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE connection_requests
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(status.as_i16())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(request_not_found(id));
        }

        Ok(())
    }
}
