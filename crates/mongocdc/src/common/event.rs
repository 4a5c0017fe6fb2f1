//! Change event representation.
//!
//! A [`ChangeEntry`] is one record of the replication log, already typed:
//! operation kind, target namespace, payload document, and the position needed
//! to resume reading after the entry. Entries are produced by the reader and
//! never mutated downstream.

use crate::common::{CdcError, Position, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation kind of a log entry.
///
/// Covers the full oplog op-code alphabet; only [`Insert`](OpKind::Insert),
/// [`Update`](OpKind::Update) and [`Delete`](OpKind::Delete) carry a
/// kind-specific event, the rest are delivered via the generic change event
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Document inserted
    Insert,
    /// Document updated
    Update,
    /// Document deleted
    Delete,
    /// Database command (e.g. collection create/drop)
    Command,
    /// Periodic no-op marker
    Noop,
    /// Any op code this client does not model
    Other,
}

impl OpKind {
    /// Map an oplog op code to a kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "i" => Self::Insert,
            "u" => Self::Update,
            "d" => Self::Delete,
            "c" => Self::Command,
            "n" => Self::Noop,
            _ => Self::Other,
        }
    }

    /// Whether this is a data modification (insert/update/delete).
    pub fn is_dml(&self) -> bool {
        matches!(self, Self::Insert | Self::Update | Self::Delete)
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Insert => write!(f, "INSERT"),
            OpKind::Update => write!(f, "UPDATE"),
            OpKind::Delete => write!(f, "DELETE"),
            OpKind::Command => write!(f, "COMMAND"),
            OpKind::Noop => write!(f, "NOOP"),
            OpKind::Other => write!(f, "OTHER"),
        }
    }
}

/// A single replication-log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// Target namespace, e.g. `"db.collection"`
    pub ns: String,
    /// Operation kind
    pub op: OpKind,
    /// Log position of this entry
    pub position: Position,
    /// Operation payload (the `o` document)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Update selector (the `o2` document, updates only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Value>,
}

impl ChangeEntry {
    /// Parse a raw log document as produced by the driver cursor.
    ///
    /// The `op` and `ts` fields are required; `ns` defaults to the empty
    /// string (no-op markers carry none), `o`/`o2` are optional.
    pub fn from_document(doc: &Value) -> Result<Self> {
        let obj = doc
            .as_object()
            .ok_or_else(|| CdcError::decode("log entry is not a document"))?;

        let op = obj
            .get("op")
            .and_then(Value::as_str)
            .map(OpKind::from_code)
            .ok_or_else(|| CdcError::decode("log entry has no op field"))?;

        let position = obj
            .get("ts")
            .and_then(Position::from_json)
            .ok_or_else(|| CdcError::decode("log entry has no usable ts field"))?;

        let ns = obj
            .get("ns")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            ns,
            op,
            position,
            payload: obj.get("o").cloned(),
            criteria: obj.get("o2").cloned(),
        })
    }

    /// Serialize the entry for republishing to downstream consumers.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
