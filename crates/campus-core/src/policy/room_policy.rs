//! Pure room-access predicate
//!
//! Rules, in precedence order:
//! 1. campus and open rooms grant every capability to any authenticated user;
//!    membership rows exist for bookkeeping only and are never consulted.
//! 2. direct rooms grant every capability iff a participant row exists.
//! 3. bootstrap: the creator of a direct room may add participants before
//!    their own participant row exists, and may do nothing else until it does.

use crate::entities::RoomType;
use crate::value_objects::RoomCapabilities;

/// Facts about one (user, room) pair, resolved by the caller beforehand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessFacts {
    pub room_type: RoomType,
    /// The user created this room
    pub is_creator: bool,
    /// A participant row (room, user) exists
    pub is_participant: bool,
}

impl AccessFacts {
    pub fn new(room_type: RoomType, is_creator: bool, is_participant: bool) -> Self {
        Self {
            room_type,
            is_creator,
            is_participant,
        }
    }

    /// Evaluate the capabilities these facts grant
    pub fn capabilities(self) -> RoomCapabilities {
        match self.room_type {
            // Type alone grants access; membership is bookkeeping
            RoomType::Campus | RoomType::Open => RoomCapabilities::ALL,
            RoomType::Direct => {
                if self.is_participant {
                    RoomCapabilities::ALL
                } else if self.is_creator {
                    // Fresh direct room: creator seeds the participant rows
                    RoomCapabilities::ADD_PARTICIPANTS
                } else {
                    RoomCapabilities::empty()
                }
            }
        }
    }

    /// Shorthand for a read-access check
    #[inline]
    pub fn can_read(self) -> bool {
        self.capabilities().can_read()
    }

    /// Shorthand for a send-access check
    #[inline]
    pub fn can_send(self) -> bool {
        self.capabilities().can_send()
    }
}
