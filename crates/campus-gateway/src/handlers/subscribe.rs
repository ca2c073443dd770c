//! Subscribe and Unsubscribe handlers (ops 2 and 3)

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::events::{GatewayEventType, SubscriptionDeniedEvent, TypingSnapshotEvent};
use crate::protocol::{CloseCode, GatewayMessage, RoomTargetPayload};
use crate::server::GatewayState;
use campus_core::RoomCapabilities;
use campus_service::{AccessService, TypingUserResponse};
use std::sync::Arc;

/// Handles Subscribe messages
pub struct SubscribeHandler;

impl SubscribeHandler {
    /// Handle a Subscribe message
    ///
    /// A denied subscription answers with a SUBSCRIPTION_DENIED dispatch
    /// instead of closing: the socket may hold other healthy subscriptions.
    /// Unknown rooms get the same answer as forbidden ones.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomTargetPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;
        let user_id = connection.user_id();
        let ctx = &state.services;

        let allowed = match ctx.room_repo().find_by_id(room_id).await? {
            Some(room) => {
                AccessService::new(ctx)
                    .check(&room, user_id, RoomCapabilities::READ_MESSAGES)
                    .await?
            }
            None => false,
        };

        if !allowed {
            tracing::debug!(
                session_id = %connection.session_id(),
                room_id = %room_id,
                "Subscription denied"
            );

            let denied = SubscriptionDeniedEvent { room_id };
            let data = serde_json::to_value(&denied).unwrap_or_default();
            let seq = connection.next_sequence();

            connection
                .send(GatewayMessage::dispatch(
                    GatewayEventType::SubscriptionDenied.as_str(),
                    seq,
                    data,
                ))
                .await
                .ok();

            return Ok(None);
        }

        // Register before reading the snapshot so signals arriving in
        // between are not lost. The client reconciles duplicates.
        state
            .connections
            .subscribe_to_room(connection.session_id(), room_id)
            .await;
        state.dispatcher.subscribe_room(room_id).await?;

        let typing = ctx.typing_store().room_typing(room_id).await?;
        let snapshot = TypingSnapshotEvent {
            room_id,
            typing: typing.into_iter().map(TypingUserResponse::from).collect(),
        };

        let data = serde_json::to_value(&snapshot).unwrap_or_default();
        let seq = connection.next_sequence();

        connection
            .send(GatewayMessage::dispatch(
                GatewayEventType::TypingSnapshot.as_str(),
                seq,
                data,
            ))
            .await
            .map_err(|e| HandlerError::Internal(format!("Failed to send TYPING_SNAPSHOT: {e}")))?;

        tracing::debug!(
            session_id = %connection.session_id(),
            user_id = %user_id,
            room_id = %room_id,
            "Subscribed to room"
        );

        Ok(None)
    }
}

/// Handles Unsubscribe messages
pub struct UnsubscribeHandler;

impl UnsubscribeHandler {
    /// Handle an Unsubscribe message
    ///
    /// Unsubscribing from a room the socket never subscribed to is a no-op.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: RoomTargetPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        let room_id = payload.room_id;

        state
            .connections
            .unsubscribe_from_room(connection.session_id(), room_id)
            .await;

        // Drop the Redis channel once no local socket wants it
        if !state.connections.room_has_subscribers(room_id) {
            state.dispatcher.unsubscribe_room(room_id).await.ok();
        }

        tracing::debug!(
            session_id = %connection.session_id(),
            room_id = %room_id,
            "Unsubscribed from room"
        );

        Ok(None)
    }
}
