//! # mongocdc - Oplog Change Data Capture
//!
//! A tailing CDC client for the MongoDB replication log: it follows the
//! oplog through a live cursor, filters entries by logical namespace, and
//! republishes them as typed change events (insert/update/delete) to
//! interested consumers, resuming automatically after transient read
//! failures.
//!
//! ## Features
//!
//! - **Tailing reads**: blocking cursor that waits for new entries instead
//!   of terminating at end-of-log
//! - **Namespace globs**: `*` wildcards, case-insensitive, pushed down to
//!   the data source as a query predicate
//! - **Automatic re-tailing**: cursor-timeout failures re-open the stream
//!   from the last tracked position; nothing is lost, boundary entries are
//!   not re-delivered
//! - **Typed fan-out**: generic change events plus insert/update/delete
//!   events, on the dispatcher and on independently scoped filters
//! - **Pluggable driver**: the session/cursor transport is a trait seam,
//!   not a bundled client
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐    ┌───────────┐    ┌──────────────────┐
//! │ Replication│───→│ LogReader │───→│ ChangeDispatcher │──→ on_change /
//! │ log cursor │    │ (classify │    │ (position track, │    on_insert /
//! │ (driver)   │    │  failures)│    │  re-tail, fan-out│    on_update /
//! └────────────┘    └───────────┘    └────────┬─────────┘    on_delete
//!                                             │
//!                                             ▼
//!                                    ┌─────────────────┐
//!                                    │ NamespaceFilter │──→ scoped
//!                                    │ (re-test, scope)│    subscribers
//!                                    └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use mongocdc::{ChangeDispatcher, DispatcherConfig};
//! use std::sync::Arc;
//!
//! let config = DispatcherConfig::builder()
//!     .url("mongodb://localhost:27017/local")
//!     .ns("shop.*")
//!     .build()?;
//!
//! // `driver` is any `Connect` implementation wrapping a database client.
//! let dispatcher = ChangeDispatcher::new(Arc::new(driver), config)?;
//!
//! dispatcher.on_insert(|entry| {
//!     println!("insert into {} at {}", entry.ns, entry.position);
//! });
//!
//! dispatcher.listen().await?;
//!
//! // Narrow a second consumer to one collection.
//! let orders = dispatcher.filter("shop.orders")?;
//! orders.on_delete(|entry| println!("order gone: {:?}", entry.payload));
//! ```

pub mod common;
pub mod oplog;

pub use common::{
    CdcError, ChangeEntry, ErrorCategory, EventBus, NsPattern, OpKind, Position, Result,
    SubscriptionId,
};
pub use oplog::{
    ChangeDispatcher, Connect, CursorOptions, DispatcherConfig, DispatcherConfigBuilder,
    DispatcherState, LogCursor, LogHandle, LogQuery, LogReader, NamespaceFilter,
    PositionResolver, Session, StatsSnapshot,
};
