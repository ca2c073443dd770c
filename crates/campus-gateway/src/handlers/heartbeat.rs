//! Heartbeat handler (op 1)

use std::sync::Arc;

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::protocol::{CloseCode, GatewayMessage};

/// Answers client heartbeats with an immediate ack.
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Record the beat and ack it.
    ///
    /// `client_seq` only feeds the trace log; the server does not replay
    /// missed events, so the value carries no other meaning here.
    pub async fn handle(
        connection: &Arc<Connection>,
        client_seq: Option<u64>,
    ) -> HandlerResult<Option<CloseCode>> {
        connection.record_heartbeat().await;

        tracing::trace!(
            session_id = %connection.session_id(),
            client_seq = ?client_seq,
            server_seq = connection.current_sequence(),
            "Heartbeat"
        );

        connection
            .send(GatewayMessage::heartbeat_ack())
            .await
            .map_err(|e| {
                tracing::warn!(
                    session_id = %connection.session_id(),
                    error = %e,
                    "Heartbeat ack did not reach the socket"
                );
                HandlerError::Internal("Heartbeat ack failed".to_string())
            })?;

        Ok(None)
    }
}
