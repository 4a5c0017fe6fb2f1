//! # Common CDC Types
//!
//! Database-agnostic building blocks for the oplog client:
//!
//! - [`ChangeEntry`] / [`OpKind`] - typed change event representation
//! - [`Position`] - monotonic resume marker into the replication log
//! - [`NsPattern`] - compiled namespace glob matching
//! - [`EventBus`] - typed publish/subscribe registry
//! - [`CdcError`] - error taxonomy with retry classification

mod bus;
mod error;
mod event;
mod pattern;
mod position;

pub use bus::*;
pub use error::*;
pub use event::*;
pub use pattern::*;
pub use position::*;
