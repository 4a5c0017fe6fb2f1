//! In-memory replication-log harness.
//!
//! Implements the driver seams over a shared, append-only vector of raw log
//! documents, with scriptable cursor failures and end signals, so the full
//! tail/re-tail/fan-out path can be exercised without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use mongocdc::{
    CdcError, Connect, CursorOptions, LogCursor, LogHandle, LogQuery, Position, Result, Session,
};
use parking_lot::Mutex;
use regex::RegexBuilder;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// One scripted cursor interruption: a failure or a clean end signal.
type Interrupt = Option<CdcError>;

struct LogState {
    entries: Mutex<Vec<Value>>,
    interrupts: Mutex<VecDeque<Interrupt>>,
    queries: Mutex<Vec<(LogQuery, CursorOptions)>>,
    notify: Notify,
}

/// A shared in-memory oplog.
#[derive(Clone)]
pub struct MemoryLog {
    state: Arc<LogState>,
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(LogState {
                entries: Mutex::new(Vec::new()),
                interrupts: Mutex::new(VecDeque::new()),
                queries: Mutex::new(Vec::new()),
                notify: Notify::new(),
            }),
        }
    }

    /// Append a well-formed oplog document.
    pub fn push(&self, t: u32, i: u32, op: &str, ns: &str) {
        self.push_doc(oplog_doc(t, i, op, ns));
    }

    /// Append a raw document, waking any tailing cursor.
    pub fn push_doc(&self, doc: Value) {
        self.state.entries.lock().push(doc);
        self.state.notify.notify_one();
    }

    /// Script the next cursor read to fail.
    pub fn inject_error(&self, err: CdcError) {
        self.state.interrupts.lock().push_back(Some(err));
        self.state.notify.notify_one();
    }

    /// Script the next cursor read to signal a clean end of stream.
    pub fn inject_end(&self) {
        self.state.interrupts.lock().push_back(None);
        self.state.notify.notify_one();
    }

    /// Every query issued against the log so far.
    pub fn queries(&self) -> Vec<(LogQuery, CursorOptions)> {
        self.state.queries.lock().clone()
    }

    /// The tailing queries only (resolver one-shots excluded).
    pub fn tailing_queries(&self) -> Vec<LogQuery> {
        self.state
            .queries
            .lock()
            .iter()
            .filter(|(_, options)| options.tailing)
            .map(|(query, _)| query.clone())
            .collect()
    }
}

/// Build a raw oplog document the way a driver would hand it over.
pub fn oplog_doc(t: u32, i: u32, op: &str, ns: &str) -> Value {
    json!({
        "ts": {"t": t, "i": i},
        "op": op,
        "ns": ns,
        "o": {"_id": format!("{t}:{i}")}
    })
}

/// Driver entry point over a [`MemoryLog`], with scriptable connect failures.
pub struct MemoryConnector {
    log: MemoryLog,
    fail_next: Mutex<Option<CdcError>>,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(log: MemoryLog) -> Arc<Self> {
        Arc::new(Self {
            log,
            fail_next: Mutex::new(None),
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Script the next `connect` call to fail.
    pub fn fail_next_connect(&self, err: CdcError) {
        *self.fail_next.lock() = Some(err);
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connect for MemoryConnector {
    async fn connect(&self, _url: &str) -> Result<Arc<dyn Session>> {
        if let Some(err) = self.fail_next.lock().take() {
            return Err(err);
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemorySession {
            log: self.log.clone(),
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MemorySession {
    log: MemoryLog,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Session for MemorySession {
    fn collection(&self, _name: &str) -> Arc<dyn LogHandle> {
        Arc::new(MemoryHandle {
            log: self.log.clone(),
        })
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MemoryHandle {
    log: MemoryLog,
}

#[async_trait]
impl LogHandle for MemoryHandle {
    async fn query(&self, query: LogQuery, options: CursorOptions) -> Result<Box<dyn LogCursor>> {
        self.log
            .state
            .queries
            .lock()
            .push((query.clone(), options.clone()));
        let filter = CursorFilter::compile(&query)?;

        if options.reverse_natural {
            let entries = self.log.state.entries.lock();
            let mut matching: Vec<Value> = entries
                .iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect();
            matching.reverse();
            if let Some(limit) = options.limit {
                matching.truncate(limit as usize);
            }
            Ok(Box::new(SnapshotCursor {
                docs: matching.into(),
            }))
        } else {
            Ok(Box::new(TailingCursor {
                log: self.log.clone(),
                filter,
                next_index: 0,
                tailing: options.tailing,
            }))
        }
    }
}

struct CursorFilter {
    min_position: Option<Position>,
    ns: Option<regex::Regex>,
}

impl CursorFilter {
    fn compile(query: &LogQuery) -> Result<Self> {
        let ns = match &query.ns_regex {
            Some(source) => Some(
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| CdcError::stream(err.to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            min_position: query.min_position,
            ns,
        })
    }

    fn matches(&self, doc: &Value) -> bool {
        if let Some(min) = self.min_position {
            match doc.get("ts").and_then(Position::from_json) {
                Some(position) if position >= min => {}
                _ => return false,
            }
        }
        if let Some(ns_regex) = &self.ns {
            let ns = doc.get("ns").and_then(Value::as_str).unwrap_or("");
            if !ns_regex.is_match(ns) {
                return false;
            }
        }
        true
    }
}

struct SnapshotCursor {
    docs: VecDeque<Value>,
}

#[async_trait]
impl LogCursor for SnapshotCursor {
    async fn next(&mut self) -> Result<Option<Value>> {
        Ok(self.docs.pop_front())
    }
}

struct TailingCursor {
    log: MemoryLog,
    filter: CursorFilter,
    next_index: usize,
    tailing: bool,
}

#[async_trait]
impl LogCursor for TailingCursor {
    async fn next(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(interrupt) = self.log.state.interrupts.lock().pop_front() {
                return match interrupt {
                    Some(err) => Err(err),
                    None => Ok(None),
                };
            }
            {
                let entries = self.log.state.entries.lock();
                while self.next_index < entries.len() {
                    let doc = &entries[self.next_index];
                    self.next_index += 1;
                    if self.filter.matches(doc) {
                        return Ok(Some(doc.clone()));
                    }
                }
            }
            if !self.tailing {
                return Ok(None);
            }
            self.log.state.notify.notified().await;
        }
    }
}

/// Poll a condition until it holds or the deadline passes.
pub async fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = tokio::time::Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

pub fn init_test_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
