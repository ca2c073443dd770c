//! Close codes in the 4000 range, sent when the server hangs up.

/// Why the server closed the socket.
///
/// Every code here is safe for the client to reconnect after; none of
/// them mean the identity or the room went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Internal failure while handling the connection
    UnknownError = 4000,
    /// Client sent an op the server does not accept
    UnknownOpcode = 4001,
    /// Frame was not valid JSON or not a valid frame
    DecodeError = 4002,
    /// Heartbeats stopped arriving
    SessionTimeout = 4009,
}

impl CloseCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text included in the close frame.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownOpcode => "Invalid opcode sent",
            Self::DecodeError => "Invalid payload encoding",
            Self::SessionTimeout => "Session timeout",
        }
    }
}
