//! Connection request database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for connection_requests table
#[derive(Debug, Clone, FromRow)]
pub struct ConnectionRequestModel {
    pub id: i64,
    pub requester_id: i64,
    pub addressee_id: i64,
    /// 0 = pending, 1 = accepted, 2 = declined
    pub status: i16,
    pub pair_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRequestModel {
    /// Check if the request is still awaiting a response
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == 0
    }
}
