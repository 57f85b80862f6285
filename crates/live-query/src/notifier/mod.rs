//! Change notification plumbing.
//!
//! A [`Notifier`] is the publish/subscribe seam between the data store and
//! live queries: every committed mutation is published as a
//! [`ChangeNotification`] naming the affected tables, and each live query
//! holds one subscription for its lifetime.
//!
//! Storage-level table names may differ from the logical names queries were
//! recorded against (attached databases), so consumers pass each raw
//! notification through [`Notifier::alias`] before intersection testing.

pub mod event_emitter;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::QualifiedTablename;

pub use event_emitter::{EventEmitter, ListenerId};

/// Identifies one active data-change subscription.
pub type SubscriptionKey = u64;

/// Callback invoked for every published change notification.
pub type ChangeCallback = Arc<dyn Fn(&ChangeNotification) + Send + Sync>;

// ============================================================================
// Notification types
// ============================================================================

/// A single table touched by a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChange {
    pub tablename: QualifiedTablename,
    /// Row ids when the producer knows them; empty means "unspecified".
    pub rowids: Vec<i64>,
}

impl TableChange {
    pub fn new(tablename: QualifiedTablename) -> Self {
        Self {
            tablename,
            rowids: Vec::new(),
        }
    }
}

/// Event carrying the set of tables affected by a just-committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    /// Physical name of the database the mutation was committed against.
    pub dbname: String,
    pub changes: Vec<TableChange>,
}

impl ChangeNotification {
    pub fn new(dbname: impl Into<String>, changes: Vec<TableChange>) -> Self {
        Self {
            dbname: dbname.into(),
            changes,
        }
    }

    /// Notification for a single table with no row information.
    pub fn for_table(dbname: impl Into<String>, tablename: QualifiedTablename) -> Self {
        Self::new(dbname, vec![TableChange::new(tablename)])
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Publish/subscribe source of data-change notifications.
///
/// One notifier instance is shared across all live queries; each query's
/// callback is independent and must not assume serialized delivery relative
/// to other subscribers.
pub trait Notifier: Send + Sync {
    /// Register `callback` for every subsequent notification. The returned
    /// key releases the subscription via
    /// [`unsubscribe_from_data_changes`](Notifier::unsubscribe_from_data_changes).
    fn subscribe_to_data_changes(&self, callback: ChangeCallback) -> SubscriptionKey;

    /// Release a subscription. Unknown keys are ignored.
    fn unsubscribe_from_data_changes(&self, key: SubscriptionKey);

    /// Map the storage-level table names in `notification` to logical ones.
    fn alias(&self, notification: &ChangeNotification) -> Vec<QualifiedTablename>;

    /// Producer side: deliver `notification` to every subscriber.
    fn publish_data_changes(&self, notification: ChangeNotification);
}

// ============================================================================
// EventNotifier
// ============================================================================

/// The standard [`Notifier`]: an [`EventEmitter`] fan-out plus an
/// attach-alias map from physical database names to logical namespaces.
pub struct EventNotifier {
    emitter: EventEmitter<ChangeNotification>,
    /// physical namespace -> logical namespace
    aliases: Mutex<HashMap<String, String>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self {
            emitter: EventEmitter::new(),
            aliases: Mutex::new(HashMap::new()),
        }
    }

    /// Record that tables under the physical namespace `dbname` are known
    /// logically as `namespace`.
    pub fn attach(&self, dbname: impl Into<String>, namespace: impl Into<String>) {
        self.aliases.lock().insert(dbname.into(), namespace.into());
    }

    pub fn detach(&self, dbname: &str) {
        self.aliases.lock().remove(dbname);
    }

    pub fn subscriber_count(&self) -> usize {
        self.emitter.len()
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for EventNotifier {
    fn subscribe_to_data_changes(&self, callback: ChangeCallback) -> SubscriptionKey {
        self.emitter.on(move |n: &ChangeNotification| callback(n))
    }

    fn unsubscribe_from_data_changes(&self, key: SubscriptionKey) {
        self.emitter.off(key);
    }

    fn alias(&self, notification: &ChangeNotification) -> Vec<QualifiedTablename> {
        let aliases = self.aliases.lock();
        notification
            .changes
            .iter()
            .map(|change| {
                let t = &change.tablename;
                match aliases.get(&t.namespace) {
                    Some(logical) => QualifiedTablename::new(logical.clone(), t.tablename.clone()),
                    None => t.clone(),
                }
            })
            .collect()
    }

    fn publish_data_changes(&self, notification: ChangeNotification) {
        self.emitter.emit(&notification);
    }
}
