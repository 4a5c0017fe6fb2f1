//! Driver seams: session, log handle, tailing cursor.
//!
//! The connection/session lifecycle and the raw transport are external
//! collaborators. These traits are the boundary: a database client adapter
//! implements them, the rest of the crate only ever talks to the trait
//! objects. Implementations live outside this crate (the test harness ships
//! an in-memory one).

use crate::common::{Position, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Query shape for reads against the replication log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    /// Lower position bound, inclusive (`position >= min_position`).
    pub min_position: Option<Position>,
    /// Anchored regex over the namespace field, to be applied
    /// case-insensitively by the driver (`$regex` with the `i` option).
    pub ns_regex: Option<String>,
}

/// Cursor behavior switches.
///
/// [`tailing`](CursorOptions::tailing) configures the steady-state read loop;
/// [`latest_entry`](CursorOptions::latest_entry) configures the resolver's
/// one-shot read for the newest log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorOptions {
    /// Keep the cursor open at end-of-log instead of terminating.
    pub tailing: bool,
    /// Block waiting for new entries rather than returning empty batches.
    pub block_for_data: bool,
    /// Allow the source to replay from a historical position.
    pub historical_replay: bool,
    /// Disable the source's idle-cursor timeout.
    pub no_idle_timeout: bool,
    /// Read in reverse natural order (newest first).
    pub reverse_natural: bool,
    /// Maximum number of entries to yield.
    pub limit: Option<u64>,
}

impl Default for CursorOptions {
    fn default() -> Self {
        Self {
            tailing: false,
            block_for_data: false,
            historical_replay: false,
            no_idle_timeout: false,
            reverse_natural: false,
            limit: None,
        }
    }
}

impl CursorOptions {
    /// Options for the live tailing read: blocking reads that wait for new
    /// entries, historical replay allowed, no idle timeout.
    pub fn tailing() -> Self {
        Self {
            tailing: true,
            block_for_data: true,
            historical_replay: true,
            no_idle_timeout: true,
            ..Self::default()
        }
    }

    /// Options for the one-shot "most recent entry" read.
    pub fn latest_entry() -> Self {
        Self {
            reverse_natural: true,
            limit: Some(1),
            ..Self::default()
        }
    }
}

/// Entry point to the database client: opens sessions.
#[async_trait]
pub trait Connect: Send + Sync {
    /// Open a session against the source database.
    async fn connect(&self, url: &str) -> Result<Arc<dyn Session>>;
}

/// An open session against the source database.
#[async_trait]
pub trait Session: Send + Sync {
    /// Get a handle to a named collection (the replication log lives in
    /// one).
    fn collection(&self, name: &str) -> Arc<dyn LogHandle>;

    /// Close the session.
    async fn close(&self) -> Result<()>;
}

/// A handle to the replication-log collection.
#[async_trait]
pub trait LogHandle: Send + Sync {
    /// Issue a query and open a cursor over the matching entries.
    async fn query(&self, query: LogQuery, options: CursorOptions) -> Result<Box<dyn LogCursor>>;
}

/// A live cursor over log entries.
///
/// `Ok(Some(doc))` yields the next raw document, `Ok(None)` signals a clean
/// end of stream, and `Err` carries a failure whose message drives the
/// retryable-vs-fatal classification.
#[async_trait]
pub trait LogCursor: Send {
    /// Advance to the next document, suspending while the log is idle when
    /// the cursor was opened in tailing mode.
    async fn next(&mut self) -> Result<Option<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tailing_options() {
        let options = CursorOptions::tailing();
        assert!(options.tailing);
        assert!(options.block_for_data);
        assert!(options.historical_replay);
        assert!(options.no_idle_timeout);
        assert!(!options.reverse_natural);
        assert_eq!(options.limit, None);
    }

    #[test]
    fn test_latest_entry_options() {
        let options = CursorOptions::latest_entry();
        assert!(!options.tailing);
        assert!(options.reverse_natural);
        assert_eq!(options.limit, Some(1));
    }
}
