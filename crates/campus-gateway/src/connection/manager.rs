//! Connection manager
//!
//! Manages all active WebSocket connections using DashMap for thread-safe access.

use super::Connection;
use crate::protocol::GatewayMessage;
use campus_core::Snowflake;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections
///
/// Uses `DashMap` for concurrent access to connection state.
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Room ID to session IDs mapping
    room_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            room_connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    ///
    /// The user is known at registration time, so the user mapping is
    /// populated immediately.
    pub fn add_connection(
        &self,
        session_id: String,
        user_id: Snowflake,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), user_id, sender);
        self.connections.insert(session_id.clone(), connection.clone());
        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(session_id.clone());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection added");

        connection
    }

    /// Remove a connection
    ///
    /// Uses `alter` for atomic modify-and-cleanup operations to avoid TOCTOU race conditions.
    pub async fn remove_connection(&self, session_id: &str) {
        if let Some((_, connection)) = self.connections.remove(session_id) {
            // Remove from user mapping
            let user_id = connection.user_id();
            self.user_connections.alter(&user_id, |_, mut sessions| {
                sessions.remove(session_id);
                sessions
            });
            self.user_connections.retain(|_, sessions| !sessions.is_empty());

            // Remove from room mappings
            for room_id in connection.rooms().await {
                self.room_connections.alter(&room_id, |_, mut sessions| {
                    sessions.remove(session_id);
                    sessions
                });
            }
            self.room_connections.retain(|_, sessions| !sessions.is_empty());

            tracing::debug!(session_id = %session_id, "Connection removed");
        }
    }

    /// Get a connection by session ID
    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Subscribe a connection to a room
    pub async fn subscribe_to_room(&self, session_id: &str, room_id: Snowflake) -> bool {
        if let Some(connection) = self.connections.get(session_id) {
            connection.subscribe_room(room_id).await;

            self.room_connections
                .entry(room_id)
                .or_default()
                .insert(session_id.to_string());

            tracing::trace!(
                session_id = %session_id,
                room_id = %room_id,
                "Connection subscribed to room"
            );

            true
        } else {
            false
        }
    }

    /// Unsubscribe a connection from a room
    pub async fn unsubscribe_from_room(&self, session_id: &str, room_id: Snowflake) -> bool {
        if let Some(connection) = self.connections.get(session_id) {
            connection.unsubscribe_room(room_id).await;

            self.room_connections.alter(&room_id, |_, mut sessions| {
                sessions.remove(session_id);
                sessions
            });
            self.room_connections.retain(|_, sessions| !sessions.is_empty());

            tracing::trace!(
                session_id = %session_id,
                room_id = %room_id,
                "Connection unsubscribed from room"
            );

            true
        } else {
            false
        }
    }

    /// Get all connections for a user
    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all connections subscribed to a room
    pub fn get_room_connections(&self, room_id: Snowflake) -> Vec<Arc<Connection>> {
        self.room_connections
            .get(&room_id)
            .map(|sessions| {
                sessions
                    .iter()
                    .filter_map(|sid| self.connections.get(sid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check whether any connection is still subscribed to a room
    pub fn room_has_subscribers(&self, room_id: Snowflake) -> bool {
        self.room_connections
            .get(&room_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }

    /// Check whether a user has any connection left
    pub fn user_has_connections(&self, user_id: Snowflake) -> bool {
        self.user_connections
            .get(&user_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }

    /// Send a message to all connections of a user
    pub async fn send_to_user(&self, user_id: Snowflake, message: GatewayMessage) -> usize {
        let connections = self.get_user_connections(user_id);
        let mut sent = 0;

        for conn in connections {
            if conn.send(message.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::trace!(
            user_id = %user_id,
            sent = sent,
            "Message sent to user connections"
        );

        sent
    }

    /// Send a message to all connections subscribed to a room
    pub async fn send_to_room(
        &self,
        room_id: Snowflake,
        message: GatewayMessage,
        exclude_user: Option<Snowflake>,
    ) -> usize {
        let connections = self.get_room_connections(room_id);
        let mut sent = 0;

        for conn in connections {
            // Skip excluded user (the typist never sees their own signal)
            if exclude_user == Some(conn.user_id()) {
                continue;
            }

            if conn.send(message.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::trace!(
            room_id = %room_id,
            sent = sent,
            "Message sent to room connections"
        );

        sent
    }

    /// Broadcast a message to all connections
    pub async fn broadcast(&self, message: GatewayMessage) -> usize {
        let mut sent = 0;

        for entry in self.connections.iter() {
            if entry.send(message.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::debug!(sent = sent, "Message broadcast to all connections");

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of unique connected users
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Get the number of rooms with active subscriptions
    pub fn room_count(&self) -> usize {
        self.room_connections.len()
    }

    /// Check if a session exists
    pub fn has_session(&self, session_id: &str) -> bool {
        self.connections.contains_key(session_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("rooms", &self.room_connections.len())
            .finish()
    }
}
