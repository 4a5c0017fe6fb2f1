/// Oplog Tailing Example
///
/// Wires a `ChangeDispatcher` to a toy in-memory driver and streams a few
/// change events through it. With a real deployment, replace `DemoDriver`
/// with an adapter over your database client that implements the
/// `Connect`/`Session`/`LogHandle`/`LogCursor` seams.
///
/// Run with:
/// ```
/// cargo run --example tail_oplog
/// ```
use async_trait::async_trait;
use mongocdc::{
    ChangeDispatcher, Connect, CursorOptions, DispatcherConfig, LogCursor, LogHandle, LogQuery,
    Position, Result, Session,
};
use parking_lot::Mutex;
use regex::RegexBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// A minimal in-memory oplog shared between the "database" and the demo.
#[derive(Clone, Default)]
struct DemoDriver {
    entries: Arc<Mutex<Vec<Value>>>,
    notify: Arc<Notify>,
}

impl DemoDriver {
    fn append(&self, t: u32, op: &str, ns: &str, payload: Value) {
        self.entries
            .lock()
            .push(json!({"ts": {"t": t, "i": 0}, "op": op, "ns": ns, "o": payload}));
        self.notify.notify_one();
    }
}

#[async_trait]
impl Connect for DemoDriver {
    async fn connect(&self, _url: &str) -> Result<Arc<dyn Session>> {
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Session for DemoDriver {
    fn collection(&self, _name: &str) -> Arc<dyn LogHandle> {
        Arc::new(self.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl LogHandle for DemoDriver {
    async fn query(&self, query: LogQuery, options: CursorOptions) -> Result<Box<dyn LogCursor>> {
        let ns_regex = match &query.ns_regex {
            Some(source) => Some(
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| mongocdc::CdcError::stream(err.to_string()))?,
            ),
            None => None,
        };
        Ok(Box::new(DemoCursor {
            driver: self.clone(),
            min_position: query.min_position.unwrap_or(Position::ZERO),
            ns_regex,
            next_index: 0,
            tailing: options.tailing,
        }))
    }
}

struct DemoCursor {
    driver: DemoDriver,
    min_position: Position,
    ns_regex: Option<regex::Regex>,
    next_index: usize,
    tailing: bool,
}

impl DemoCursor {
    fn selects(&self, doc: &Value) -> bool {
        let position = doc.get("ts").and_then(Position::from_json);
        if !position.is_some_and(|p| p >= self.min_position) {
            return false;
        }
        match &self.ns_regex {
            Some(ns_regex) => {
                let ns = doc.get("ns").and_then(Value::as_str).unwrap_or("");
                ns_regex.is_match(ns)
            }
            None => true,
        }
    }
}

#[async_trait]
impl LogCursor for DemoCursor {
    async fn next(&mut self) -> Result<Option<Value>> {
        loop {
            {
                let entries = self.driver.entries.lock();
                while self.next_index < entries.len() {
                    let doc = entries[self.next_index].clone();
                    self.next_index += 1;
                    if self.selects(&doc) {
                        return Ok(Some(doc));
                    }
                }
            }
            if !self.tailing {
                return Ok(None);
            }
            self.driver.notify.notified().await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let driver = DemoDriver::default();

    let config = DispatcherConfig::builder()
        .url("mongodb://localhost:27017/local")
        .ns("shop.*")
        .since(Position::new(1, 0))
        .build()?;
    let dispatcher = ChangeDispatcher::new(Arc::new(driver.clone()), config)?;

    dispatcher.on_change(|entry| {
        println!("change  {} {} at {}", entry.op, entry.ns, entry.position);
    });
    dispatcher.on_insert(|entry| {
        println!("insert  payload: {:?}", entry.payload);
    });

    println!("Listening for changes on shop.*...\n");
    dispatcher.listen().await?;

    // A scoped consumer that only cares about one collection.
    let orders = dispatcher.filter("shop.orders")?;
    orders.on_delete(|entry| {
        println!("orders  deleted: {:?}", entry.payload);
    });

    // Simulate some database activity.
    driver.append(2, "i", "shop.orders", json!({"_id": 1, "total": 42}));
    driver.append(3, "u", "shop.users", json!({"$set": {"name": "Ada"}}));
    driver.append(4, "d", "shop.orders", json!({"_id": 1}));
    driver.append(5, "i", "crm.leads", json!({"_id": 7})); // filtered out

    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("\nlast position: {}", dispatcher.position());
    dispatcher.destroy().await;
    Ok(())
}
