//! Op code handlers
//!
//! Handles incoming WebSocket messages based on their operation code.

mod error;
mod heartbeat;
mod subscribe;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use subscribe::{SubscribeHandler, UnsubscribeHandler};
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage, OpCode};
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client messages to appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client message
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: GatewayMessage,
    ) -> HandlerResult<Option<CloseCode>> {
        // Validate that this is a client-sendable op code
        if !message.op.is_client_op() {
            tracing::warn!(
                session_id = %connection.session_id(),
                op = %message.op,
                "Received server-only op code from client"
            );
            return Ok(Some(CloseCode::UnknownOpcode));
        }

        match message.op {
            OpCode::Heartbeat => {
                let seq = message.as_heartbeat_seq().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Heartbeat payload".to_string())
                })?;

                HeartbeatHandler::handle(connection, seq).await
            }
            OpCode::Subscribe => {
                let payload = message.as_room_target().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Subscribe payload".to_string())
                })?;

                SubscribeHandler::handle(state, connection, payload).await
            }
            OpCode::Unsubscribe => {
                let payload = message.as_room_target().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Unsubscribe payload".to_string())
                })?;

                UnsubscribeHandler::handle(state, connection, payload).await
            }
            OpCode::TypingStart => {
                let payload = message.as_room_target().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Typing Start payload".to_string())
                })?;

                TypingHandler::handle_start(state, connection, payload).await
            }
            OpCode::TypingStop => {
                let payload = message.as_room_target().ok_or_else(|| {
                    HandlerError::InvalidPayload("Invalid Typing Stop payload".to_string())
                })?;

                TypingHandler::handle_stop(state, connection, payload).await
            }
            // These ops should never reach here due to is_client_op check
            _ => {
                tracing::error!(op = %message.op, "Unhandled client op code");
                Ok(Some(CloseCode::UnknownOpcode))
            }
        }
    }
}
