//! Start-position resolution.
//!
//! One-shot lookup of the position to resume tailing from; not part of the
//! steady-state read loop.

use crate::common::{CdcError, Position, Result};
use crate::oplog::driver::{CursorOptions, LogHandle, LogQuery};
use tracing::debug;

/// Resolves the replication-log position a fresh tail should start at.
pub struct PositionResolver;

impl PositionResolver {
    /// Resolve the starting position.
    ///
    /// An explicit position is returned unchanged. Otherwise the most recent
    /// entry currently in the log decides (one read in reverse natural order,
    /// limit 1); an empty log resolves to [`Position::ZERO`].
    pub async fn resolve(explicit: Option<Position>, handle: &dyn LogHandle) -> Result<Position> {
        if let Some(position) = explicit {
            return Ok(position);
        }

        let mut cursor = handle
            .query(LogQuery::default(), CursorOptions::latest_entry())
            .await?;

        let resolved = match cursor.next().await? {
            Some(doc) => doc
                .get("ts")
                .and_then(Position::from_json)
                .ok_or_else(|| CdcError::decode("latest log entry has no usable ts field"))?,
            None => Position::ZERO,
        };
        debug!(position = %resolved, "resolved start position from log tail");
        Ok(resolved)
    }
}
