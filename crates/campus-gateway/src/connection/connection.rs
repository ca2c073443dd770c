//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection. The user is known from the
//! upgrade request, so a connection is bound to its user for its whole
//! lifetime; only room subscriptions change.

use crate::protocol::GatewayMessage;
use campus_core::Snowflake;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, RwLock};

/// A single WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// User this socket belongs to
    user_id: Snowflake,

    /// Channel to send messages to the WebSocket
    sender: mpsc::Sender<GatewayMessage>,

    /// Last sequence number sent
    sequence: AtomicU64,

    /// Last heartbeat received
    last_heartbeat: RwLock<Instant>,

    /// Whether we've received a heartbeat since the last liveness check
    heartbeat_acked: RwLock<bool>,

    /// Rooms this connection is subscribed to
    rooms: RwLock<HashSet<Snowflake>>,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        session_id: String,
        user_id: Snowflake,
        sender: mpsc::Sender<GatewayMessage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id,
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: RwLock::new(Instant::now()),
            heartbeat_acked: RwLock::new(true),
            rooms: RwLock::new(HashSet::new()),
        })
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the user ID
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Get the current sequence number
    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Record a heartbeat received
    pub async fn record_heartbeat(&self) {
        *self.last_heartbeat.write().await = Instant::now();
        *self.heartbeat_acked.write().await = true;
    }

    /// Get time since last heartbeat
    pub async fn time_since_heartbeat(&self) -> std::time::Duration {
        self.last_heartbeat.read().await.elapsed()
    }

    /// Check whether a heartbeat arrived since the last liveness check
    pub async fn is_heartbeat_acked(&self) -> bool {
        *self.heartbeat_acked.read().await
    }

    /// Mark the start of a liveness window
    pub async fn await_heartbeat(&self) {
        *self.heartbeat_acked.write().await = false;
    }

    /// Add a room subscription
    pub async fn subscribe_room(&self, room_id: Snowflake) {
        self.rooms.write().await.insert(room_id);
    }

    /// Remove a room subscription
    pub async fn unsubscribe_room(&self, room_id: Snowflake) {
        self.rooms.write().await.remove(&room_id);
    }

    /// Get all subscribed rooms
    pub async fn rooms(&self) -> Vec<Snowflake> {
        self.rooms.read().await.iter().copied().collect()
    }

    /// Check if subscribed to a room
    pub async fn is_subscribed_to(&self, room_id: Snowflake) -> bool {
        self.rooms.read().await.contains(&room_id)
    }

    /// Send a message to this connection
    pub async fn send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::SendError<GatewayMessage>> {
        self.sender.send(message).await
    }

    /// Try to send a message (non-blocking)
    pub fn try_send(
        &self,
        message: GatewayMessage,
    ) -> Result<(), mpsc::error::TrySendError<GatewayMessage>> {
        self.sender.try_send(message)
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .finish()
    }
}
