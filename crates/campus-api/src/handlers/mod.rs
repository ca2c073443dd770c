//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod connections;
pub mod files;
pub mod health;
pub mod messages;
pub mod receipts;
pub mod rooms;
pub mod users;
