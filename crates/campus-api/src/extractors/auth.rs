//! Caller identity extractor
//!
//! The campus auth proxy terminates the session in front of this service
//! and forwards the verified identity as `X-User-Id` (and optionally
//! `X-User-Name`). This extractor reads those headers and provisions a
//! profile row the first time a user shows up.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use campus_core::Snowflake;
use campus_service::ProfileService;

use crate::response::ApiError;
use crate::state::AppState;

/// Header carrying the verified user ID
const USER_ID_HEADER: &str = "x-user-id";
/// Optional header carrying the user's display name
const USER_NAME_HEADER: &str = "x-user-name";
/// Display name recorded when the proxy sends none
const DEFAULT_DISPLAY_NAME: &str = "Unknown";

/// Authenticated user resolved from the identity headers
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID from the identity headers
    pub user_id: Snowflake,
    /// Display name of the provisioned profile
    pub display_name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(ApiError::MissingAuth)?
            .to_str()
            .map_err(|_| ApiError::InvalidAuthFormat)?;

        let user_id: Snowflake = raw_id.trim().parse().map_err(|_| {
            tracing::warn!(header = raw_id, "Malformed user id header");
            ApiError::InvalidAuthFormat
        })?;

        let display_name = parts
            .headers
            .get(USER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME);

        // The first request from a user creates their profile row, so
        // every later message insert has a sender to reference.
        let app_state = AppState::from_ref(state);
        let profile = ProfileService::new(&app_state.services)
            .ensure(user_id, display_name)
            .await?;

        Ok(AuthUser {
            user_id,
            display_name: profile.display_name,
        })
    }
}
