//! # campus-api
//!
//! REST surface of the campus chat system: rooms, messages, receipts,
//! uploads, and presence queries, served by axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_state, router, run};
pub use state::AppState;
