//! Typed publish/subscribe registry for change events.
//!
//! An [`EventBus`] holds one callback slot per event kind: the generic change
//! event, the three kind-specific events (insert/update/delete), the end
//! signal and the error signal. Subscribing returns a [`SubscriptionId`];
//! detaching is explicit and confirmed, never silent.
//!
//! Emission holds a slot's read lock while callbacks run and detach takes the
//! write lock, so once `unsubscribe` or `clear` returns, no further delivery
//! to the removed subscribers is possible. The flip side: callbacks must not
//! subscribe or unsubscribe on the bus that is invoking them.

use crate::common::{CdcError, ChangeEntry, OpKind};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle identifying one subscription on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type EntryCallback = Box<dyn Fn(&ChangeEntry) + Send + Sync>;
type EndCallback = Box<dyn Fn() + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&CdcError) + Send + Sync>;

struct Slot<F>(RwLock<Vec<(SubscriptionId, F)>>);

impl<F> Default for Slot<F> {
    fn default() -> Self {
        Self(RwLock::new(Vec::new()))
    }
}

impl<F> Slot<F> {
    fn insert(&self, id: SubscriptionId, callback: F) {
        self.0.write().push((id, callback));
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.0.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    fn clear(&self) {
        self.0.write().clear();
    }

    fn len(&self) -> usize {
        self.0.read().len()
    }
}

/// Typed event fan-out point shared by the dispatcher and every filter.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    change: Slot<EntryCallback>,
    insert: Slot<EntryCallback>,
    update: Slot<EntryCallback>,
    delete: Slot<EntryCallback>,
    end: Slot<EndCallback>,
    error: Slot<ErrorCallback>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Subscribe to every change entry.
    pub fn on_change(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.change.insert(id, Box::new(callback));
        id
    }

    /// Subscribe to insert entries only.
    pub fn on_insert(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.insert.insert(id, Box::new(callback));
        id
    }

    /// Subscribe to update entries only.
    pub fn on_update(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.update.insert(id, Box::new(callback));
        id
    }

    /// Subscribe to delete entries only.
    pub fn on_delete(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.delete.insert(id, Box::new(callback));
        id
    }

    /// Subscribe to the clean end-of-stream signal.
    pub fn on_end(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = self.allocate_id();
        self.end.insert(id, Box::new(callback));
        id
    }

    /// Subscribe to fatal stream and connection errors.
    pub fn on_error(
        &self,
        callback: impl Fn(&CdcError) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.error.insert(id, Box::new(callback));
        id
    }

    /// Detach one subscription. Returns whether it was still attached;
    /// repeat calls are a confirmed no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.change.remove(id)
            || self.insert.remove(id)
            || self.update.remove(id)
            || self.delete.remove(id)
            || self.end.remove(id)
            || self.error.remove(id)
    }

    /// Detach every subscription.
    pub fn clear(&self) {
        self.change.clear();
        self.insert.clear();
        self.update.clear();
        self.delete.clear();
        self.end.clear();
        self.error.clear();
    }

    /// Number of attached subscriptions across all slots.
    pub fn subscriber_count(&self) -> usize {
        self.change.len()
            + self.insert.len()
            + self.update.len()
            + self.delete.len()
            + self.end.len()
            + self.error.len()
    }

    /// Emit one entry: the generic change event first, then the
    /// kind-specific event when the operation maps to one.
    pub fn emit_entry(&self, entry: &ChangeEntry) {
        for (_, callback) in self.change.0.read().iter() {
            callback(entry);
        }
        let kind_slot = match entry.op {
            OpKind::Insert => &self.insert,
            OpKind::Update => &self.update,
            OpKind::Delete => &self.delete,
            _ => return,
        };
        for (_, callback) in kind_slot.0.read().iter() {
            callback(entry);
        }
    }

    /// Emit the end-of-stream signal.
    pub fn emit_end(&self) {
        for (_, callback) in self.end.0.read().iter() {
            callback();
        }
    }

    /// Emit an error event.
    pub fn emit_error(&self, err: &CdcError) {
        for (_, callback) in self.error.0.read().iter() {
            callback(err);
        }
    }
}
