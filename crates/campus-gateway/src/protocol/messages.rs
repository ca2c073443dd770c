//! Frame envelope shared by both directions of the socket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CloseCode, HelloPayload, OpCode, RoomTargetPayload};

/// One WebSocket frame.
///
/// `t`, `s`, and `d` are omitted from the wire whenever they are `None`;
/// only Dispatch frames carry an event type and sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub op: OpCode,

    /// Event type, Dispatch frames only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Per-connection sequence number, Dispatch frames only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Frame body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayMessage {
    /// A bare frame with nothing but the op.
    const fn control(op: OpCode) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d: None,
        }
    }

    /// Dispatch frame (op 0) carrying an event.
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            t: Some(event_type.into()),
            s: Some(sequence),
            d: Some(data),
        }
    }

    /// Hello frame (op 10), the first thing the server says.
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self {
            d: serde_json::to_value(payload).ok(),
            ..Self::control(OpCode::Hello)
        }
    }

    /// Heartbeat ack frame (op 11).
    #[must_use]
    pub fn heartbeat_ack() -> Self {
        Self::control(OpCode::HeartbeatAck)
    }

    /// Server-initiated heartbeat probe (op 1).
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            d: last_sequence.map(|s| Value::Number(s.into())),
            ..Self::control(OpCode::Heartbeat)
        }
    }

    /// Room target of a Subscribe, Unsubscribe, TypingStart, or
    /// TypingStop frame. `None` for any other op or an unparseable body.
    pub fn as_room_target(&self) -> Option<RoomTargetPayload> {
        match self.op {
            OpCode::Subscribe | OpCode::Unsubscribe | OpCode::TypingStart | OpCode::TypingStop => {
                serde_json::from_value(self.d.clone()?).ok()
            }
            _ => None,
        }
    }

    /// Sequence number inside a client heartbeat.
    ///
    /// Outer `None` means the frame is not a heartbeat; inner `None` means
    /// the client has not received a Dispatch yet.
    pub fn as_heartbeat_seq(&self) -> Option<Option<u64>> {
        (self.op == OpCode::Heartbeat).then(|| self.d.as_ref().and_then(Value::as_u64))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Numeric code and reason text for a close frame.
    #[must_use]
    pub fn close_frame(code: CloseCode) -> (u16, String) {
        (code.as_u16(), code.description().to_string())
    }
}
