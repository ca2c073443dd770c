//! Wire protocol for the gateway socket: op codes, the frame envelope,
//! payload shapes, and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::GatewayMessage;
pub use opcodes::{OpCode, UnknownOpCode};
pub use payloads::{HelloPayload, RoomTargetPayload};
