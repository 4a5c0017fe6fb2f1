//! Scoped namespace filters over a dispatcher's event stream.
//!
//! A [`NamespaceFilter`] narrows the dispatcher's generic change stream to
//! entries matching an additional namespace pattern, for one consumer,
//! without affecting other consumers. It holds a non-owning subscription into
//! the dispatcher's bus and re-emits matching entries on its own bus.

use crate::common::{CdcError, ChangeEntry, EventBus, NsPattern, SubscriptionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A secondary, independently detachable subscriber scope.
///
/// Dropping the filter detaches it; [`destroy`](Self::destroy) does the same
/// explicitly and is idempotent.
pub struct NamespaceFilter {
    pattern_source: String,
    bus: Arc<EventBus>,
    parent: Arc<EventBus>,
    subscription: SubscriptionId,
    ignore: Arc<AtomicBool>,
    destroyed: AtomicBool,
}

impl NamespaceFilter {
    pub(crate) fn attach(parent: Arc<EventBus>, ns: &str) -> Self {
        let pattern = NsPattern::compile(Some(ns));
        let bus = Arc::new(EventBus::new());
        let ignore = Arc::new(AtomicBool::new(false));

        let subscription = {
            let bus = Arc::clone(&bus);
            let ignore = Arc::clone(&ignore);
            let matcher = pattern.clone();
            parent.on_change(move |entry| {
                if ignore.load(Ordering::SeqCst) || !matcher.matches(&entry.ns) {
                    return;
                }
                bus.emit_entry(entry);
            })
        };
        debug!(pattern = ns, "namespace filter attached");

        Self {
            pattern_source: pattern.pattern().to_string(),
            bus,
            parent,
            subscription,
            ignore,
            destroyed: AtomicBool::new(false),
        }
    }

    /// The namespace glob this filter re-tests against.
    pub fn pattern(&self) -> &str {
        &self.pattern_source
    }

    /// Suppress re-emission without detaching.
    pub fn pause(&self) {
        self.ignore.store(true, Ordering::SeqCst);
    }

    /// Resume re-emission.
    pub fn resume(&self) {
        self.ignore.store(false, Ordering::SeqCst);
    }

    /// Detach from the dispatcher and release this filter's subscribers.
    /// Idempotent; the dispatcher and sibling filters are unaffected. No
    /// event reaches this filter's subscribers after the call returns.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.parent.unsubscribe(self.subscription);
        self.bus.clear();
        debug!(pattern = %self.pattern_source, "namespace filter destroyed");
    }

    /// Subscribe to every matching change entry.
    pub fn on_change(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.on_change(callback)
    }

    /// Subscribe to matching insert entries only.
    pub fn on_insert(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.on_insert(callback)
    }

    /// Subscribe to matching update entries only.
    pub fn on_update(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.on_update(callback)
    }

    /// Subscribe to matching delete entries only.
    pub fn on_delete(
        &self,
        callback: impl Fn(&ChangeEntry) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.on_delete(callback)
    }

    /// Subscribe to fatal errors re-raised on this filter's scope.
    pub fn on_error(
        &self,
        callback: impl Fn(&CdcError) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.bus.on_error(callback)
    }

    /// Detach one subscription from this filter. Confirmed, idempotent.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}

impl Drop for NamespaceFilter {
    fn drop(&mut self) {
        self.destroy();
    }
}
