//! Read receipt entity - per-user acknowledgement of a message

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Read receipt, unique per (message, user)
///
/// A message is "read by" a user iff this row exists. Senders never get a
/// receipt for their own messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadReceipt {
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub read_at: DateTime<Utc>,
}

impl ReadReceipt {
    pub fn new(message_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            message_id,
            user_id,
            read_at: Utc::now(),
        }
    }
}
