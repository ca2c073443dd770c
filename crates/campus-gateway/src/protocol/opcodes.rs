//! Wire op codes for gateway frames.
//!
//! Every frame carries one of these in its `op` field. Identity comes from
//! the upgrade request headers, so there is no authentication op; clients
//! only heartbeat, manage room subscriptions, and signal typing.

use serde::{Deserialize, Serialize};

/// Frame type, sent on the wire as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum OpCode {
    Dispatch = 0,
    Heartbeat = 1,
    Subscribe = 2,
    Unsubscribe = 3,
    TypingStart = 4,
    TypingStop = 5,
    Hello = 10,
    HeartbeatAck = 11,
}

/// Who may put an op on the wire. Heartbeat is the one op both sides send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ClientOnly,
    ServerOnly,
    Both,
}

impl OpCode {
    const WIRE_TABLE: [OpCode; 8] = [
        Self::Dispatch,
        Self::Heartbeat,
        Self::Subscribe,
        Self::Unsubscribe,
        Self::TypingStart,
        Self::TypingStop,
        Self::Hello,
        Self::HeartbeatAck,
    ];

    const fn direction(self) -> Direction {
        match self {
            Self::Heartbeat => Direction::Both,
            Self::Subscribe | Self::Unsubscribe | Self::TypingStart | Self::TypingStop => {
                Direction::ClientOnly
            }
            Self::Dispatch | Self::Hello | Self::HeartbeatAck => Direction::ServerOnly,
        }
    }

    /// Whether a client is allowed to send this op.
    #[must_use]
    pub const fn is_client_op(self) -> bool {
        matches!(self.direction(), Direction::ClientOnly | Direction::Both)
    }

    /// Whether the server ever sends this op.
    #[must_use]
    pub const fn is_server_op(self) -> bool {
        matches!(self.direction(), Direction::ServerOnly | Direction::Both)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

/// A numeric op outside the protocol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOpCode(pub u8);

impl std::fmt::Display for UnknownOpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown op code {}", self.0)
    }
}

impl std::error::Error for UnknownOpCode {}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::WIRE_TABLE
            .into_iter()
            .find(|op| *op as u8 == value)
            .ok_or(UnknownOpCode(value))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Subscribe => "Subscribe",
            Self::Unsubscribe => "Unsubscribe",
            Self::TypingStart => "TypingStart",
            Self::TypingStop => "TypingStop",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        };
        write!(f, "{name} ({})", *self as u8)
    }
}
