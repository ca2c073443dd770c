//! Room handlers
//!
//! Endpoints for room listing, creation, and participants.

use axum::{
    extract::{Path, State},
    Json,
};
use campus_service::{
    AddParticipantRequest, CreateOpenRoomRequest, OpenDirectRoomRequest, ParticipantResponse,
    RoomResponse, RoomService,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// List rooms the caller belongs to
///
/// GET /rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let service = RoomService::new(&state.services);
    let rooms = service.list_rooms_for(auth.user_id).await?;
    Ok(Json(rooms))
}

/// Get the campus-wide room, creating it on first access
///
/// POST /rooms/campus
pub async fn campus_room(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<RoomResponse>> {
    let service = RoomService::new(&state.services);
    let response = service.get_or_create_campus_room(auth.user_id).await?;
    Ok(Json(response))
}

/// Create an open room with an initial invitee
///
/// POST /rooms/open
pub async fn create_open_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateOpenRoomRequest>,
) -> ApiResult<Created<Json<RoomResponse>>> {
    let invitee_id = request
        .invitee_id
        .parse()
        .map_err(|_| ApiError::invalid_body("Invalid invitee_id format"))?;

    let service = RoomService::new(&state.services);
    let response = service
        .create_open_room(auth.user_id, invitee_id, request.name)
        .await?;
    Ok(Created(Json(response)))
}

/// Open (or return the existing) direct room with another user
///
/// POST /rooms/direct
pub async fn open_direct_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<OpenDirectRoomRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let recipient_id = request
        .recipient_id
        .parse()
        .map_err(|_| ApiError::invalid_body("Invalid recipient_id format"))?;

    let service = RoomService::new(&state.services);
    let response = service.open_direct_room(auth.user_id, recipient_id).await?;
    Ok(Json(response))
}

/// Get room by ID
///
/// GET /rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<RoomResponse>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;

    let service = RoomService::new(&state.services);
    let response = service.get_room(room_id, auth.user_id).await?;
    Ok(Json(response))
}

/// List room participants
///
/// GET /rooms/{room_id}/participants
pub async fn get_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
) -> ApiResult<Json<Vec<ParticipantResponse>>> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;

    let service = RoomService::new(&state.services);
    let participants = service.room_participants(room_id, auth.user_id).await?;
    Ok(Json(participants))
}

/// Add a participant to a room
///
/// POST /rooms/{room_id}/participants
pub async fn add_participant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(room_id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddParticipantRequest>,
) -> ApiResult<NoContent> {
    let room_id = room_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid room_id format"))?;
    let new_member_id = request
        .user_id
        .parse()
        .map_err(|_| ApiError::invalid_body("Invalid user_id format"))?;

    let service = RoomService::new(&state.services);
    service
        .add_participant(room_id, auth.user_id, new_member_id)
        .await?;
    Ok(NoContent)
}
