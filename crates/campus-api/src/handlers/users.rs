//! User profile handlers
//!
//! Endpoints for the caller's own profile and public profile lookup.

use axum::{
    extract::{Path, State},
    Json,
};
use campus_service::{ProfileResponse, ProfileService, UpdateProfileRequest};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Get current user's profile
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let service = ProfileService::new(&state.services);
    let response = service.get(auth.user_id).await?;
    Ok(Json(response))
}

/// Update current user's profile
///
/// PATCH /users/@me
pub async fn update_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let service = ProfileService::new(&state.services);
    let response = service.update(auth.user_id, request).await?;
    Ok(Json(response))
}

/// Get a user's profile by ID
///
/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let user_id = user_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid user_id format"))?;

    let service = ProfileService::new(&state.services);
    let response = service.get(user_id).await?;
    Ok(Json(response))
}
