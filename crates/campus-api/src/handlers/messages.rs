//! Message handlers
//!
//! Endpoints for message operations.

use axum::{
    extract::{Path, State},
    Json,
};
use campus_service::{MessageResponse, MessageService, SendMessageRequest};

use crate::extractors::{AuthUser, Pagination, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Get messages in a room, ascending by creation time
///
/// GET /rooms/{room_id}/messages
///
/// Listing also marks the returned page as read by the caller.
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;

    let service = MessageService::new(&state.services);
    let messages = service
        .list(room_id, auth.user_id, pagination.into())
        .await?;
    Ok(Json(messages))
}

/// Send a message
///
/// POST /rooms/{room_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;

    let service = MessageService::new(&state.services);
    let response = service.send(room_id, auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Get message by ID
///
/// GET /rooms/{room_id}/messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((room_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;
    let message_id = message_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid message_id format"))?;

    let service = MessageService::new(&state.services);
    let response = service.get_message(room_id, message_id, auth.user_id).await?;
    Ok(Json(response))
}

/// Delete own message
///
/// DELETE /rooms/{room_id}/messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((room_id, message_id)): Path<(String, String)>,
) -> ApiResult<NoContent> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;
    let message_id = message_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid message_id format"))?;

    let service = MessageService::new(&state.services);
    service.delete(room_id, message_id, auth.user_id).await?;
    Ok(NoContent)
}
