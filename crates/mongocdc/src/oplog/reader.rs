//! Live tailing reader over the replication log.
//!
//! A [`LogReader`] owns one cursor opened in tailing mode and yields a lazy,
//! effectively infinite sequence of [`ChangeEntry`] values. It applies the
//! namespace filter at the query level so non-matching entries never cross
//! the network, and it classifies read failures so the dispatcher can decide
//! between re-tailing and surfacing an error. A reader is not restartable:
//! after a failure the dispatcher opens a fresh one at the tracked position.

use crate::common::{CdcError, ChangeEntry, NsPattern, Position, Result};
use crate::oplog::driver::{CursorOptions, LogCursor, LogHandle, LogQuery};
use tracing::{debug, warn};

/// A live, non-restartable entry stream. Dropping it releases the cursor.
pub struct LogReader {
    cursor: Box<dyn LogCursor>,
}

impl LogReader {
    /// Open a tailing cursor at `start` (inclusive), filtered to the given
    /// namespace pattern at the data-source level.
    pub async fn open(
        handle: &dyn LogHandle,
        pattern: &NsPattern,
        start: Position,
    ) -> Result<Self> {
        let query = LogQuery {
            min_position: Some(start),
            ns_regex: pattern.query_regex().map(String::from),
        };
        debug!(start = %start, pattern = pattern.pattern(), "opening tailing cursor");
        let cursor = handle
            .query(query, CursorOptions::tailing())
            .await
            .map_err(reclassify)?;
        Ok(Self { cursor })
    }

    /// Next entry in log order. `Ok(None)` is a clean end of stream; errors
    /// are classified retryable vs. fatal. Documents the reader cannot parse
    /// are skipped.
    pub async fn next_entry(&mut self) -> Result<Option<ChangeEntry>> {
        loop {
            match self.cursor.next().await {
                Ok(Some(doc)) => match ChangeEntry::from_document(&doc) {
                    Ok(entry) => return Ok(Some(entry)),
                    Err(err) => {
                        warn!(%err, "skipping undecodable log entry");
                        continue;
                    }
                },
                Ok(None) => return Ok(None),
                Err(err) => return Err(reclassify(err)),
            }
        }
    }
}

/// Run a raw cursor failure through the retryable-vs-fatal message
/// classification. Non-stream errors pass through untouched.
fn reclassify(err: CdcError) -> CdcError {
    match err {
        CdcError::Stream(msg) => CdcError::classify_read_error(msg),
        other => other,
    }
}
