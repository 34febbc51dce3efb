//! Time-ordered 64-bit identifiers shared by every stored record.
//!
//! Layout (most significant first):
//! - 42 bits: milliseconds since [`Snowflake::EPOCH`]
//! - 10 bits: worker id
//! - 12 bits: per-millisecond sequence

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const WORKER_MASK: i64 = (1 << WORKER_BITS) - 1;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

/// Identifier of a user, post, reply, message or notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// 2025-01-01T00:00:00Z in Unix milliseconds
    pub const EPOCH: i64 = 1_735_689_600_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Unix milliseconds encoded in the id
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> (WORKER_BITS + SEQUENCE_BITS)) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & WORKER_MASK) as u16
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake: {0:?}")]
    InvalidFormat(String),
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

// Browsers lose precision above 2^53, so ids travel as strings.
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
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Snowflake(n)),
            Raw::Text(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Lock-free, monotonic id source for one worker.
///
/// The last issued `(millis << 12) | sequence` pair lives in a single atomic.
/// When a millisecond's 4096 sequence numbers run out the generator borrows
/// from the next millisecond instead of blocking.
pub struct SnowflakeGenerator {
    worker_id: u16,
    last: AtomicI64,
}

impl SnowflakeGenerator {
    /// Worker ids are reduced to their low 10 bits; configuration validates the range.
    pub fn new(worker_id: u16) -> Self {
        Self {
            worker_id: (i64::from(worker_id) & WORKER_MASK) as u16,
            last: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        let floor = (Utc::now().timestamp_millis() - Snowflake::EPOCH).max(0) << SEQUENCE_BITS;
        let mut last = self.last.load(Ordering::Acquire);
        loop {
            let next = floor.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return self.compose(next),
                Err(current) => last = current,
            }
        }
    }

    fn compose(&self, state: i64) -> Snowflake {
        let millis = state >> SEQUENCE_BITS;
        let sequence = state & SEQUENCE_MASK;
        Snowflake::new(
            (millis << (WORKER_BITS + SEQUENCE_BITS))
                | (i64::from(self.worker_id) << SEQUENCE_BITS)
                | sequence,
        )
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

impl fmt::Debug for SnowflakeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn parses_and_displays() {
        let id = Snowflake::parse("987654321").unwrap();
        assert_eq!(id.into_inner(), 987_654_321);
        assert_eq!(id.to_string(), "987654321");
        assert!(Snowflake::parse("abc").is_err());
    }

    #[test]
    fn json_uses_strings_and_accepts_numbers() {
        let id = Snowflake::new(123_456_789_012_345_678);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"123456789012345678\"");

        let from_str: Snowflake = serde_json::from_str("\"42\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
    }

    #[test]
    fn generated_ids_increase() {
        let gen = SnowflakeGenerator::new(3);
        let mut last = Snowflake::default();
        for _ in 0..10_000 {
            let id = gen.generate();
            assert!(id > last);
            assert_eq!(id.worker_id(), 3);
            last = id;
        }
    }

    #[test]
    fn timestamp_tracks_wall_clock() {
        let before = Utc::now().timestamp_millis();
        let id = SnowflakeGenerator::new(1).generate();
        let after = Utc::now().timestamp_millis();
        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }

    #[test]
    fn unique_across_threads() {
        let gen = Arc::new(SnowflakeGenerator::new(7));
        let seen = Arc::new(Mutex::new(HashSet::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    let ids: Vec<_> = (0..2_000).map(|_| gen.generate()).collect();
                    seen.lock().unwrap().extend(ids);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(seen.lock().unwrap().len(), 8_000);
    }
}
