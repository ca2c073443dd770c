//! Connection request entity - the friend-request edge between two users
//!
//! Acceptance is what auto-creates a direct room for the pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::room::direct_pair_key;
use crate::value_objects::Snowflake;

/// Connection request lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionStatus {
    Pending = 0,
    Accepted = 1,
    Declined = 2,
}

impl ConnectionStatus {
    #[inline]
    #[must_use]
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl From<i16> for ConnectionStatus {
    fn from(value: i16) -> Self {
        match value {
            1 => Self::Accepted,
            2 => Self::Declined,
            _ => Self::Pending,
        }
    }
}

impl From<ConnectionStatus> for i16 {
    fn from(status: ConnectionStatus) -> Self {
        status as i16
    }
}

/// Connection request entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub id: Snowflake,
    pub requester_id: Snowflake,
    pub addressee_id: Snowflake,
    pub status: ConnectionStatus,
    /// Normalized pair identity, unique while the request is live
    pub pair_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConnectionRequest {
    pub fn new(id: Snowflake, requester_id: Snowflake, addressee_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            requester_id,
            addressee_id,
            status: ConnectionStatus::Pending,
            pair_key: direct_pair_key(requester_id, addressee_id),
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.status, ConnectionStatus::Pending)
    }

    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, ConnectionStatus::Accepted)
    }

    /// Whether the given user is one of the two parties
    #[must_use]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }

    /// The party on the other side, if the given user is involved at all
    #[must_use]
    pub fn other_party(&self, user_id: Snowflake) -> Option<Snowflake> {
        if user_id == self.requester_id {
            Some(self.addressee_id)
        } else if user_id == self.addressee_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// Mark accepted
    pub fn accept(&mut self) {
        self.status = ConnectionStatus::Accepted;
        self.updated_at = Utc::now();
    }

    /// Mark declined
    pub fn decline(&mut self) {
        self.status = ConnectionStatus::Declined;
        self.updated_at = Utc::now();
    }
}
