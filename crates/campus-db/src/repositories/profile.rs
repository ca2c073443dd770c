//! PostgreSQL implementation of ProfileRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use campus_core::entities::Profile;
use campus_core::traits::{ProfileRepository, RepoResult};
use campus_core::value_objects::Snowflake;

use crate::models::ProfileModel;

use super::error::{map_db_error, profile_not_found};

/// PostgreSQL implementation of ProfileRepository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new PgProfileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Profile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r"
            SELECT id, display_name, department, bio, skills, avatar_path,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Profile::from))
    }

    #[instrument(skip(self, ids))]
    async fn find_many(&self, ids: &[Snowflake]) -> RepoResult<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i64> = ids.iter().map(|s| s.into_inner()).collect();

        let results = sqlx::query_as::<_, ProfileModel>(
            r"
            SELECT id, display_name, department, bio, skills, avatar_path,
                   created_at, updated_at
            FROM profiles
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Profile::from).collect())
    }

    #[instrument(skip(self, profile))]
    async fn create(&self, profile: &Profile) -> RepoResult<()> {
        // Upstream identity may race two first requests for the same user;
        // the second insert is a no-op.
        sqlx::query(
            r"
            INSERT INTO profiles (id, display_name, department, bio, skills, avatar_path,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(profile.id.into_inner())
        .bind(&profile.display_name)
        .bind(&profile.department)
        .bind(&profile.bio)
        .bind(&profile.skills)
        .bind(&profile.avatar_path)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, profile))]
    async fn update(&self, profile: &Profile) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE profiles
            SET display_name = $2, department = $3, bio = $4, skills = $5,
                avatar_path = $6, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(profile.id.into_inner())
        .bind(&profile.display_name)
        .bind(&profile.department)
        .bind(&profile.bio)
        .bind(&profile.skills)
        .bind(&profile.avatar_path)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(profile_not_found(profile.id));
        }

        Ok(())
    }
}
