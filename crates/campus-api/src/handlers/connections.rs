//! Connection request handlers
//!
//! Endpoints for sending, accepting, and declining connection requests.

use axum::{
    extract::{Path, State},
    Json,
};
use campus_service::{ConnectionResponse, ConnectionService, SendConnectionRequest};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// List connection requests involving the caller
///
/// GET /connections
pub async fn list_connections(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ConnectionResponse>>> {
    let service = ConnectionService::new(&state.services);
    let connections = service.list_for(auth.user_id).await?;
    Ok(Json(connections))
}

/// Send a connection request
///
/// POST /connections
pub async fn send_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendConnectionRequest>,
) -> ApiResult<Created<Json<ConnectionResponse>>> {
    let addressee_id = request
        .addressee_id
        .parse()
        .map_err(|_| ApiError::invalid_body("Invalid addressee_id format"))?;

    let service = ConnectionService::new(&state.services);
    let response = service.send_request(auth.user_id, addressee_id).await?;
    Ok(Created(Json(response)))
}

/// Accept a pending connection request
///
/// POST /connections/{request_id}/accept
pub async fn accept_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> ApiResult<Json<ConnectionResponse>> {
    let request_id = request_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid request_id format"))?;

    let service = ConnectionService::new(&state.services);
    let response = service.accept(request_id, auth.user_id).await?;
    Ok(Json(response))
}

/// Decline a pending connection request
///
/// POST /connections/{request_id}/decline
pub async fn decline_connection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> ApiResult<Json<ConnectionResponse>> {
    let request_id = request_id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid request_id format"))?;

    let service = ConnectionService::new(&state.services);
    let response = service.decline(request_id, auth.user_id).await?;
    Ok(Json(response))
}
