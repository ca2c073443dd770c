//! Typing presence module.
//!
//! Short-TTL typing indicators with snapshot-on-join semantics.

mod typing_store;

pub use typing_store::{TypingData, TypingStore};
