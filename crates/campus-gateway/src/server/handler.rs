//! WebSocket handler
//!
//! Handles WebSocket connections and message processing.

use crate::connection::Connection;
use crate::events::{GatewayEventType, ReadyEvent, UserPayload};
use crate::handlers::MessageDispatcher;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload};
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use campus_core::Snowflake;
use campus_service::{ProfileService, RoomService, TypingService};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Default heartbeat interval in milliseconds
const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

/// Timeout for no heartbeat before considering connection dead
const HEARTBEAT_TIMEOUT_MS: u64 = 90_000;

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// Header carrying the verified user ID
const USER_ID_HEADER: &str = "x-user-id";
/// Optional header carrying the user's display name
const USER_NAME_HEADER: &str = "x-user-name";
/// Display name recorded when the proxy sends none
const DEFAULT_DISPLAY_NAME: &str = "Unknown";

/// WebSocket gateway handler
///
/// The campus auth proxy terminates the session in front of this service
/// and forwards the verified identity as `X-User-Id` (and optionally
/// `X-User-Name`). A request without a usable identity never upgrades.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(raw_id) = headers.get(USER_ID_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::debug!("Upgrade request without identity header");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let user_id: Snowflake = match raw_id.trim().parse() {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!(header = raw_id, "Malformed user id header");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    let display_name = headers
        .get(USER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME);

    // The profile row must exist before the socket's first subscribe
    let profile = match ProfileService::new(&state.services)
        .ensure(user_id, display_name)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to provision profile");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, user_id, profile.display_name))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(
    state: GatewayState,
    socket: WebSocket,
    user_id: Snowflake,
    display_name: String,
) {
    let session_id = uuid::Uuid::new_v4().to_string();

    // Create message channel for outgoing messages
    let (tx, mut rx) = mpsc::channel::<GatewayMessage>(MESSAGE_BUFFER_SIZE);

    // Register connection
    let connection = state
        .connections
        .add_connection(session_id.clone(), user_id, tx);

    tracing::info!(
        session_id = %session_id,
        user_id = %user_id,
        "WebSocket connection established"
    );

    // Deliver user-targeted events to this socket
    state.dispatcher.subscribe_user(user_id).await.ok();

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Send Hello message immediately
    let hello = GatewayMessage::hello(HelloPayload::with_interval(HEARTBEAT_INTERVAL_MS));
    if let Ok(json) = hello.to_json() {
        if ws_sink.send(Message::Text(json.into())).await.is_err() {
            tracing::warn!(session_id = %session_id, "Failed to send Hello message");
            cleanup_connection(&state, &session_id, &connection).await;
            return;
        }
    }

    // READY carries the room list so the client knows what it may subscribe to
    if let Err(close_code) = send_ready(&state, &connection, &display_name).await {
        send_close(&mut ws_sink, close_code).await;
        cleanup_connection(&state, &session_id, &connection).await;
        return;
    }

    let mut heartbeat_interval = interval(Duration::from_millis(HEARTBEAT_INTERVAL_MS / 2));

    // One loop owns the sink: incoming frames, outgoing queue and the
    // liveness check all run here, so close frames actually reach the peer.
    let close_code: Option<CloseCode> = loop {
        tokio::select! {
            incoming = ws_stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(close_code) =
                            handle_text_message(&state, &connection, &text).await
                        {
                            tracing::debug!(
                                session_id = %session_id,
                                close_code = ?close_code,
                                "Closing connection due to error"
                            );
                            break Some(close_code);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(
                            session_id = %session_id,
                            "Binary messages not supported"
                        );
                        break Some(CloseCode::DecodeError);
                    }
                    Some(Ok(Message::Ping(_))) => {
                        tracing::trace!(session_id = %session_id, "Ping received");
                        // Pong is handled automatically by axum
                    }
                    Some(Ok(Message::Pong(_))) => {
                        tracing::trace!(session_id = %session_id, "Pong received");
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(session_id = %session_id, "Client closed connection");
                        break None;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            session_id = %session_id,
                            error = %e,
                            "WebSocket error"
                        );
                        break None;
                    }
                    None => break None,
                }
            }

            outgoing = rx.recv() => {
                match outgoing {
                    Some(msg) => {
                        match msg.to_json() {
                            Ok(json) => {
                                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                                    tracing::warn!(
                                        session_id = %session_id,
                                        "Failed to send message to WebSocket"
                                    );
                                    break None;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(
                                    session_id = %session_id,
                                    error = %e,
                                    "Failed to serialize outgoing message"
                                );
                            }
                        }
                    }
                    None => break None,
                }
            }

            _ = heartbeat_interval.tick() => {
                let time_since = connection.time_since_heartbeat().await;

                if time_since > Duration::from_millis(HEARTBEAT_TIMEOUT_MS) {
                    tracing::warn!(
                        session_id = %session_id,
                        time_since_ms = time_since.as_millis(),
                        "Connection timed out (no heartbeat)"
                    );
                    break Some(CloseCode::SessionTimeout);
                }

                if time_since > Duration::from_millis(HEARTBEAT_INTERVAL_MS) {
                    if connection.is_heartbeat_acked().await {
                        // Probe a quiet client once; it has until the next
                        // tick to answer
                        connection.await_heartbeat().await;
                        connection.send(GatewayMessage::heartbeat(None)).await.ok();
                    } else {
                        tracing::warn!(
                            session_id = %session_id,
                            "Connection zombied (heartbeat probe unanswered)"
                        );
                        break Some(CloseCode::SessionTimeout);
                    }
                }
            }
        }
    };

    if let Some(code) = close_code {
        send_close(&mut ws_sink, code).await;
    } else {
        ws_sink.close().await.ok();
    }

    cleanup_connection(&state, &session_id, &connection).await;
}

/// Send READY with the caller's profile and room list
async fn send_ready(
    state: &GatewayState,
    connection: &Arc<Connection>,
    display_name: &str,
) -> Result<(), CloseCode> {
    let user_id = connection.user_id();

    let rooms = match RoomService::new(&state.services)
        .list_rooms_for(user_id)
        .await
    {
        Ok(rooms) => rooms,
        Err(e) => {
            tracing::error!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to load rooms for READY"
            );
            return Err(CloseCode::UnknownError);
        }
    };

    let ready = ReadyEvent {
        v: 1,
        user: UserPayload {
            id: user_id,
            display_name: display_name.to_string(),
        },
        session_id: connection.session_id().to_string(),
        rooms,
    };

    let data = serde_json::to_value(&ready).unwrap_or_default();
    let seq = connection.next_sequence();

    connection
        .send(GatewayMessage::dispatch(
            GatewayEventType::Ready.as_str(),
            seq,
            data,
        ))
        .await
        .map_err(|_| CloseCode::UnknownError)?;

    tracing::debug!(
        session_id = %connection.session_id(),
        user_id = %user_id,
        "READY sent"
    );

    Ok(())
}

/// Handle a text message from the client
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    // Parse the message
    let message = match GatewayMessage::from_json(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(
                session_id = %connection.session_id(),
                error = %e,
                "Failed to parse message"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    tracing::trace!(
        session_id = %connection.session_id(),
        op = %message.op,
        "Received message"
    );

    // Dispatch to handler
    match MessageDispatcher::dispatch(state, connection, message).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(
                session_id = %connection.session_id(),
                error = %e,
                "Handler error"
            );
            Err(e.to_close_code())
        }
    }
}

/// Send a close frame with the given code
async fn send_close(ws_sink: &mut SplitSink<WebSocket, Message>, code: CloseCode) {
    let (code_num, reason) = GatewayMessage::close_frame(code);
    ws_sink
        .send(Message::Close(Some(CloseFrame {
            code: code_num,
            reason: reason.into(),
        })))
        .await
        .ok();
}

/// Clean up a connection on disconnect
async fn cleanup_connection(state: &GatewayState, session_id: &str, connection: &Arc<Connection>) {
    tracing::info!(session_id = %session_id, "Cleaning up connection");

    let user_id = connection.user_id();
    let rooms = connection.rooms().await;

    // Typing indicators do not survive the socket that raised them
    if !rooms.is_empty() {
        TypingService::new(&state.services)
            .clear_for_user(&rooms, user_id)
            .await
            .ok();
    }

    state.connections.remove_connection(session_id).await;

    // Prune Redis channels no local socket listens to anymore
    for room_id in rooms {
        if !state.connections.room_has_subscribers(room_id) {
            state
                .dispatcher
                .unsubscribe_room(room_id)
                .await
                .ok();
        }
    }

    if !state.connections.user_has_connections(user_id) {
        state.dispatcher.unsubscribe_user(user_id).await.ok();
    }
}
