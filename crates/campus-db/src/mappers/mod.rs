//! Entity to model mappers
//!
//! Conversions between domain entities (campus-core) and database models:
//! `From<Model> for Entity` turns database rows into domain objects.

mod connection;
mod message;
mod profile;
mod receipt;
mod room;
