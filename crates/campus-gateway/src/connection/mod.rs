//! Connection management
//!
//! Manages WebSocket connections and message routing.

mod connection;
mod manager;

pub use connection::Connection;
pub use manager::ConnectionManager;
