//! # campus-gateway
//!
//! WebSocket gateway for real-time chat: room subscriptions, typing
//! signals, and fan-out of events published over Redis Pub/Sub.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{build_state, router, run, GatewayState};
