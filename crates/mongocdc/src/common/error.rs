//! Error types for oplog CDC operations.
//!
//! Includes the read-failure classification that drives automatic re-tailing:
//! cursor-timeout failures are retryable, everything else is fatal.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Error categories for logging and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration errors (invalid settings, invalid call sequence)
    Configuration,
    /// Session-collaborator failures (connect, close)
    Connection,
    /// Read failures on the replication log cursor
    Stream,
    /// Serialization/decoding errors
    Serialization,
}

/// CDC-specific errors
#[derive(Error, Debug)]
pub enum CdcError {
    /// Configuration error: missing URL, or an operation invoked in an
    /// invalid state (e.g. `filter()` before `listen()`). Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session-collaborator failure. Surfaced on the error channel; does not
    /// trigger automatic re-tailing.
    #[error("connection error: {0}")]
    Connection(String),

    /// Fatal read failure on the log cursor. Surfaced on the error channel;
    /// the stream stays down until `listen()` is called again.
    #[error("stream error: {0}")]
    Stream(String),

    /// Transient read failure (cursor killed/timed out, exceeded time
    /// limit). Recovered automatically by re-opening the cursor from the
    /// last tracked position; never surfaced to subscribers.
    #[error("retryable stream error: {0}")]
    RetryableStream(String),

    /// A log document the reader could not parse. Skipped, never surfaced.
    #[error("malformed log entry: {0}")]
    Decode(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message patterns the source emits when a tailing cursor dies of old age.
static CURSOR_TIMEOUT: LazyLock<regex::Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"cursor (killed or )?timed out|exceeded time limit")
        .case_insensitive(true)
        .build()
        .expect("hard-coded pattern")
});

impl CdcError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a fatal stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Classify a raw cursor failure message.
    ///
    /// Failures matching the cursor-timeout patterns become
    /// [`RetryableStream`](Self::RetryableStream); anything else is a fatal
    /// [`Stream`](Self::Stream) error.
    pub fn classify_read_error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if CURSOR_TIMEOUT.is_match(&msg) {
            Self::RetryableStream(msg)
        } else {
            Self::Stream(msg)
        }
    }

    /// Check if this error is recovered by re-tailing.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::RetryableStream(_))
    }

    /// Get the error category for logging and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Connection(_) => ErrorCategory::Connection,
            Self::Stream(_) | Self::RetryableStream(_) => ErrorCategory::Stream,
            Self::Decode(_) | Self::Json(_) => ErrorCategory::Serialization,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config_error",
            Self::Connection(_) => "connection_error",
            Self::Stream(_) => "stream_error",
            Self::RetryableStream(_) => "retryable_stream_error",
            Self::Decode(_) => "decode_error",
            Self::Json(_) => "json_error",
        }
    }
}

/// Result type for CDC operations
pub type Result<T> = std::result::Result<T, CdcError>;
