//! Snowflake ID - time-ordered 64-bit identifier used for every row
//!
//! Layout:
//! - Bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - Bits 21-12: worker ID (0-1023)
//! - Bits 11-0:  per-millisecond sequence (0-4095)

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

const SEQUENCE_BITS: u32 = 12;
const WORKER_BITS: u32 = 10;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_WORKER_ID: u16 = (1 << WORKER_BITS) - 1;

/// Time-ordered 64-bit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Zero is never produced by the generator
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Milliseconds since the Unix epoch encoded in the id
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> (SEQUENCE_BITS + WORKER_BITS)) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & i64::from(MAX_WORKER_ID)) as u16
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        (self.0 & SEQUENCE_MASK) as u16
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp()).unwrap_or_default()
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from a path segment or JSON string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid id format")]
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
        Snowflake::parse(s)
    }
}

// Serialized as a string: browsers lose precision above 2^53
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an id as a string or integer")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Snowflake, E> {
                Ok(Snowflake(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Snowflake, E> {
                i64::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("id out of range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Snowflake, E> {
                Snowflake::parse(value).map_err(|_| de::Error::custom("invalid id string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Lock-free Snowflake generator
///
/// The last issued `(millis, sequence)` pair lives in one atomic word. When
/// the sequence for a millisecond runs out, or the wall clock steps
/// backwards, the generator borrows the next logical millisecond instead of
/// sleeping, so ids stay strictly increasing.
pub struct SnowflakeGenerator {
    worker_id: u16,
    state: AtomicI64,
}

impl SnowflakeGenerator {
    /// Worker IDs wrap at 1024
    pub fn new(worker_id: u16) -> Self {
        Self {
            worker_id: worker_id & MAX_WORKER_ID,
            state: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        loop {
            let prev = self.state.load(Ordering::Acquire);
            let prev_ms = prev >> SEQUENCE_BITS;
            let now_ms = current_millis() - Snowflake::EPOCH;

            let next = if now_ms > prev_ms {
                now_ms << SEQUENCE_BITS
            } else {
                let seq = (prev & SEQUENCE_MASK) + 1;
                if seq > SEQUENCE_MASK {
                    (prev_ms + 1) << SEQUENCE_BITS
                } else {
                    (prev_ms << SEQUENCE_BITS) | seq
                }
            };

            if self
                .state
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let millis = next >> SEQUENCE_BITS;
                let seq = next & SEQUENCE_MASK;
                return Snowflake::new(
                    (millis << (SEQUENCE_BITS + WORKER_BITS))
                        | (i64::from(self.worker_id) << SEQUENCE_BITS)
                        | seq,
                );
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(Snowflake::EPOCH)
}
