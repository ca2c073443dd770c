//! Typing Start and Typing Stop handlers (ops 4 and 5)

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::{CloseCode, RoomTargetPayload};
use crate::server::GatewayState;
use campus_service::TypingService;
use std::sync::Arc;

/// Handles typing signals
///
/// Typing is best effort end to end. A signal for a room the socket is not
/// subscribed to is dropped, and service failures are logged and swallowed
/// rather than closing the connection over an indicator.
pub struct TypingHandler;

impl TypingHandler {
    /// Handle a Typing Start message
    pub async fn handle_start(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomTargetPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;

        if !connection.is_subscribed_to(room_id).await {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                "Typing start for unsubscribed room, ignoring"
            );
            return Ok(None);
        }

        if let Err(e) = TypingService::new(&state.services)
            .start(room_id, connection.user_id())
            .await
        {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                error = %e,
                "Typing start rejected"
            );
        }

        Ok(None)
    }

    /// Handle a Typing Stop message
    pub async fn handle_stop(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomTargetPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;

        if !connection.is_subscribed_to(room_id).await {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                "Typing stop for unsubscribed room, ignoring"
            );
            return Ok(None);
        }

        if let Err(e) = TypingService::new(&state.services)
            .stop(room_id, connection.user_id())
            .await
        {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                error = %e,
                "Typing stop rejected"
            );
        }

        Ok(None)
    }
}
