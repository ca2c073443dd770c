//! Room capabilities - what a user may do inside a specific room
//!
//! Produced by the access policy in [`crate::policy`]; never stored.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Per-room access grants
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoomCapabilities: u32 {
        /// Read the room's message history
        const READ_MESSAGES     = 1 << 0;
        /// Send messages into the room
        const SEND_MESSAGES     = 1 << 1;
        /// See the room's participant list
        const VIEW_PARTICIPANTS = 1 << 2;
        /// Insert participant rows for the room
        const ADD_PARTICIPANTS  = 1 << 3;

        /// Full access, granted to participants and to campus/open rooms
        const ALL = Self::READ_MESSAGES.bits()
            | Self::SEND_MESSAGES.bits()
            | Self::VIEW_PARTICIPANTS.bits()
            | Self::ADD_PARTICIPANTS.bits();
    }
}

impl RoomCapabilities {
    #[inline]
    pub fn can_read(&self) -> bool {
        self.contains(Self::READ_MESSAGES)
    }

    #[inline]
    pub fn can_send(&self) -> bool {
        self.contains(Self::SEND_MESSAGES)
    }

    #[inline]
    pub fn can_view_participants(&self) -> bool {
        self.contains(Self::VIEW_PARTICIPANTS)
    }

    #[inline]
    pub fn can_add_participants(&self) -> bool {
        self.contains(Self::ADD_PARTICIPANTS)
    }
}

impl fmt::Display for RoomCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
