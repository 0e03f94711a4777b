//! The change-event bus driving cache invalidation on entry mutation.
//!
//! Every entry mutation emits an `entry_changed` event consumed by
//! downstream caches (feedback cache, entity index, optional query-result
//! cache). Delivery is synchronous, in the emitter's own call stack, in
//! arrival order; one subscriber's panic or error is isolated from the
//! others; subscribing or unsubscribing from within a subscriber callback
//! must not invalidate the emission currently in progress.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::MAX_EVENT_SUBSCRIBERS;
use crate::model::entry::{EntryId, EntryKind};
use crate::model::scope::Scope;

/// The mutation kind that produced a `ChangeEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
    Deactivate,
}

/// `{ entryType, entryId, scopeType, scopeId, action }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub entry_type: EntryKind,
    pub entry_id: EntryId,
    pub scope_type: String,
    pub scope_id: Option<String>,
    pub action: ChangeAction,
}

impl ChangeEvent {
    pub fn new(entry_type: EntryKind, entry_id: EntryId, scope: &Scope, action: ChangeAction) -> Self {
        Self {
            entry_type,
            entry_id,
            scope_type: scope.type_name().to_string(),
            scope_id: scope.id().map(str::to_string),
            action,
        }
    }
}

type Subscriber = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Process-scoped, explicitly constructed pub/sub bus. No ambient singleton.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<BTreeMap<u64, Subscriber>>,
}

/// Handle returned by `subscribe`, used to `unsubscribe` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            subscribers: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registers a subscriber. Excess registrations beyond
    /// `MAX_EVENT_SUBSCRIBERS` are dropped with a single logged warning
    /// and `None` is returned.
    pub fn subscribe<F>(&self, callback: F) -> Option<SubscriptionId>
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.lock().expect("event bus mutex poisoned");
        if subs.len() >= MAX_EVENT_SUBSCRIBERS {
            warn!(
                limit = MAX_EVENT_SUBSCRIBERS,
                "event bus subscriber limit reached, dropping registration"
            );
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        subs.insert(id, Arc::new(callback));
        Some(SubscriptionId(id))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscribers.lock().expect("event bus mutex poisoned");
        subs.remove(&id.0);
    }

    /// Delivers `event` to every current subscriber, in ascending
    /// subscription-id (arrival) order. A snapshot of subscriber handles is
    /// cloned up front and the lock released before any callback runs, so
    /// subscribe/unsubscribe calls made from within a callback never affect
    /// the emission already in progress and never deadlock against this
    /// bus's own mutex. Each callback runs behind `catch_unwind` so one
    /// subscriber's panic cannot prevent delivery to the rest.
    pub fn emit(&self, event: &ChangeEvent) {
        let snapshot: Vec<(u64, Subscriber)> = {
            let subs = self.subscribers.lock().expect("event bus mutex poisoned");
            subs.iter().map(|(id, cb)| (*id, cb.clone())).collect()
        };
        for (id, callback) in snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(event)));
            if result.is_err() {
                warn!(subscriber_id = id, "event bus subscriber panicked, isolating");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("event bus mutex poisoned").len()
    }
}
