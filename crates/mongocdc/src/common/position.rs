//! Oplog positions.
//!
//! A [`Position`] locates a single entry in the replication log. It mirrors
//! the BSON oplog timestamp: 32 bits of wall-clock seconds plus a 32-bit
//! ordinal that distinguishes entries committed within the same second, packed
//! into one `u64` so positions order and compare as plain integers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A totally ordered marker into the replication log.
///
/// Positions are opaque to consumers: the only supported operations are
/// comparison, serialization (for external persistence of resume state), and
/// reconstruction from a previously persisted value.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Position(u64);

impl Position {
    /// The epoch position, ordered before every real log entry.
    pub const ZERO: Position = Position(0);

    /// Create a position from wall-clock seconds and an intra-second ordinal.
    pub const fn new(time: u32, ordinal: u32) -> Self {
        Self(((time as u64) << 32) | ordinal as u64)
    }

    /// Normalize a raw scalar timestamp (Unix seconds) into a position.
    ///
    /// Callers may supply a plain wall-clock second as a starting point; it
    /// maps to the first possible position within that second.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self::new(secs.min(u32::MAX as u64) as u32, 0)
    }

    /// Reconstruct a position from its packed representation.
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// The packed representation, suitable for external persistence.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Wall-clock seconds component.
    pub const fn time(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Intra-second ordinal component.
    pub const fn ordinal(&self) -> u32 {
        self.0 as u32
    }

    /// Whether this is the epoch position.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract a position from the `ts` field of a raw log document.
    ///
    /// Accepts the shapes drivers produce for a BSON timestamp: a packed
    /// integer, a `{"t": .., "i": ..}` object, or the extended-JSON
    /// `{"$timestamp": {"t": .., "i": ..}}` wrapper.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::Object(map) => {
                if let Some(inner) = map.get("$timestamp") {
                    return Self::from_json(inner);
                }
                let time = map.get("t").and_then(Value::as_u64)?;
                let ordinal = map.get("i").and_then(Value::as_u64).unwrap_or(0);
                Some(Self::new(time as u32, ordinal as u32))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.time(), self.ordinal())
    }
}
