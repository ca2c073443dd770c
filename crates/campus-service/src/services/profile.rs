//! Profile service
//!
//! Profiles mirror the upstream identity provider; chat provisions them
//! lazily on first request and lets users edit the directory fields.

use campus_core::entities::Profile;
use campus_core::Snowflake;
use tracing::{info, instrument};

use crate::dto::{ProfileResponse, UpdateProfileRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Profile service
pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    /// Create a new ProfileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get a profile by id
    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Snowflake) -> ServiceResult<ProfileResponse> {
        let profile = self
            .ctx
            .profile_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", user_id.to_string()))?;

        Ok(ProfileResponse::from(profile))
    }

    /// Provision a profile for an authenticated identity
    ///
    /// Called on every authenticated request. The id comes from the
    /// identity provider, not from our generator. Two racing first
    /// requests both succeed; the insert is a no-op for the loser and the
    /// canonical row is re-read afterwards.
    #[instrument(skip(self))]
    pub async fn ensure(
        &self,
        user_id: Snowflake,
        display_name: &str,
    ) -> ServiceResult<Profile> {
        if let Some(profile) = self.ctx.profile_repo().find_by_id(user_id).await? {
            return Ok(profile);
        }

        let profile = Profile::new(user_id, display_name.to_string());
        self.ctx.profile_repo().create(&profile).await?;

        info!(user_id = %user_id, "Profile provisioned");

        self.ctx
            .profile_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::internal("Profile vanished after provisioning"))
    }

    /// Update the caller's own profile
    ///
    /// Absent fields keep their current value.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<ProfileResponse> {
        let mut profile = self
            .ctx
            .profile_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", user_id.to_string()))?;

        if let Some(display_name) = request.display_name {
            profile.set_display_name(display_name);
        }
        if let Some(department) = request.department {
            profile.department = Some(department);
        }
        if let Some(bio) = request.bio {
            profile.bio = Some(bio);
        }
        if let Some(skills) = request.skills {
            profile.skills = skills;
        }
        if let Some(avatar_path) = request.avatar_path {
            profile.set_avatar_path(Some(avatar_path));
        }

        self.ctx.profile_repo().update(&profile).await?;

        info!(user_id = %user_id, "Profile updated");

        Ok(ProfileResponse::from(profile))
    }
}
