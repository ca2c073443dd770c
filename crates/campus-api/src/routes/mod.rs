//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.
//! Token downloads sit outside the versioned prefix so the URLs handed
//! out by the temp-url endpoint stay short-lived opaque paths.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{connections, files, health, messages, receipts, rooms, users};
use crate::state::AppState;

/// Slack on top of the attachment ceiling for multipart framing
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main API router (excluding health, which bypasses rate limiting)
pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api_v1_routes(max_upload_bytes))
        .route("/downloads/:token", get(files::download))
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(room_routes())
        .merge(connection_routes())
        .merge(file_routes(max_upload_bytes))
}

/// User profile routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users/@me", patch(users::update_current_user))
        .route("/users/:user_id", get(users::get_user))
}

/// Room, message, and receipt routes
fn room_routes() -> Router<AppState> {
    Router::new()
        // Room access and creation
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/campus", post(rooms::campus_room))
        .route("/rooms/open", post(rooms::create_open_room))
        .route("/rooms/direct", post(rooms::open_direct_room))
        .route("/rooms/:room_id", get(rooms::get_room))
        // Participants
        .route("/rooms/:room_id/participants", get(rooms::get_participants))
        .route("/rooms/:room_id/participants", post(rooms::add_participant))
        // Messages
        .route("/rooms/:room_id/messages", get(messages::get_messages))
        .route("/rooms/:room_id/messages", post(messages::create_message))
        .route(
            "/rooms/:room_id/messages/:message_id",
            get(messages::get_message),
        )
        .route(
            "/rooms/:room_id/messages/:message_id",
            delete(messages::delete_message),
        )
        // Read receipts
        .route(
            "/rooms/:room_id/messages/:message_id/read",
            post(receipts::mark_read),
        )
        .route("/rooms/:room_id/read", post(receipts::mark_room_read))
}

/// Connection request routes
fn connection_routes() -> Router<AppState> {
    Router::new()
        .route("/connections", get(connections::list_connections))
        .route("/connections", post(connections::send_connection))
        .route(
            "/connections/:request_id/accept",
            post(connections::accept_connection),
        )
        .route(
            "/connections/:request_id/decline",
            post(connections::decline_connection),
        )
}

/// File upload and temporary URL routes
fn file_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            post(files::upload_file)
                .layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
        .route(
            "/attachments/:attachment_id/temp-url",
            post(files::create_temp_url),
        )
}
