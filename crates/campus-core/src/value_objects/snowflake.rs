//! Snowflake ID - 64-bit time-ordered unique identifier.
//!
//! Every persisted row gets one of these, and message history pagination
//! leans on the property that sorting by id is sorting by creation time.
//!
//! Layout:
//! - Bits 63-22: milliseconds since the custom epoch
//! - Bits 21-12: worker ID (0-1023)
//! - Bits 11-0:  per-millisecond sequence (0-4095)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const TIMESTAMP_SHIFT: u32 = 22;
const WORKER_SHIFT: u32 = 12;
const WORKER_MASK: i64 = 0x3FF;
const SEQUENCE_MASK: i64 = 0xFFF;

/// Time-ordered 64-bit identifier used for every persisted row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2025-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1735689600000;

    /// Wrap a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Unwrap to the raw i64
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Whether this is the zero (uninitialized) id
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Creation time in milliseconds since the Unix epoch
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> TIMESTAMP_SHIFT) + Self::EPOCH
    }

    /// Worker that generated this id
    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> WORKER_SHIFT) & WORKER_MASK) as u16
    }

    /// Creation time as a UTC datetime
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp()).unwrap_or_default()
    }

    /// Parse from the decimal string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse()
    }
}

/// Error when parsing a Snowflake from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

// JSON gets the string form: JavaScript numbers lose precision past 2^53
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// Accept both the string form and a bare integer
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(Snowflake(n)),
            Raw::Str(s) => s
                .parse::<i64>()
                .map(Snowflake)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Thread-safe Snowflake generator.
///
/// Issues up to 4096 ids per millisecond per worker. The last-used
/// millisecond and sequence live packed in a single atomic word, so one
/// compare-exchange claims both and ids from one worker are strictly
/// increasing.
pub struct SnowflakeGenerator {
    worker_id: u16,
    /// `millis << 12 | sequence` of the most recently issued id
    state: AtomicI64,
}

impl SnowflakeGenerator {
    /// Create a generator for the given worker.
    ///
    /// # Panics
    /// Panics if `worker_id` does not fit in 10 bits.
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id < 1024, "Worker ID must be < 1024");
        Self {
            worker_id,
            state: AtomicI64::new(0),
        }
    }

    /// Generate the next id
    pub fn generate(&self) -> Snowflake {
        loop {
            let now = wall_clock_millis();
            let current = self.state.load(Ordering::Acquire);
            let last_ms = current >> WORKER_SHIFT;
            let last_seq = current & SEQUENCE_MASK;

            let claim = if now > last_ms {
                // Fresh millisecond, sequence restarts at zero
                now << WORKER_SHIFT
            } else if last_seq < SEQUENCE_MASK {
                // Same millisecond, or the clock stepped backwards: keep
                // issuing from the last millisecond so ids stay ordered
                current + 1
            } else {
                // 4096 ids burned in one millisecond; spin into the next
                while wall_clock_millis() <= last_ms {
                    std::hint::spin_loop();
                }
                continue;
            };

            if self
                .state
                .compare_exchange(current, claim, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let millis = claim >> WORKER_SHIFT;
                let sequence = claim & SEQUENCE_MASK;
                return Snowflake::new(
                    ((millis - Snowflake::EPOCH) << TIMESTAMP_SHIFT)
                        | (i64::from(self.worker_id) << WORKER_SHIFT)
                        | sequence,
                );
            }
            // Lost the race to another thread; reload and retry
        }
    }

    /// Worker ID of this generator
    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn wall_clock_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as i64)
}
