//! Read receipt handlers
//!
//! Endpoints for marking messages read.

use axum::{
    extract::{Path, State},
    Json,
};
use campus_service::{MarkReadResponse, ReceiptService, RoomReadResponse};

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Mark a single message as read
///
/// POST /rooms/{room_id}/messages/{message_id}/read
///
/// Repeat calls succeed with `marked: false`.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((room_id, message_id)): Path<(String, String)>,
) -> ApiResult<Json<MarkReadResponse>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;
    let message_id = message_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid message_id format"))?;

    let service = ReceiptService::new(&state.services);
    let marked = service.mark_read(room_id, message_id, auth.user_id).await?;
    Ok(Json(MarkReadResponse { marked }))
}

/// Mark every unread message in a room as read
///
/// POST /rooms/{room_id}/read
pub async fn mark_room_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<RoomReadResponse>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;

    let service = ReceiptService::new(&state.services);
    let marked_count = service.mark_room_read(room_id, auth.user_id).await?;
    Ok(Json(RoomReadResponse { marked_count }))
}
