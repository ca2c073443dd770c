//! Value objects - immutable types that represent domain concepts

mod capabilities;
mod snowflake;

pub use capabilities::RoomCapabilities;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
