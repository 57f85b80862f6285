//! Tests for `EventNotifier` — fan-out, alias translation, and the
//! snapshot semantics of an emission round.

use std::sync::{Arc, Mutex};

use live_query::notifier::{ChangeNotification, EventNotifier, Notifier, SubscriptionKey};
use live_query::types::QualifiedTablename;

fn qt(namespace: &str, table: &str) -> QualifiedTablename {
    QualifiedTablename::new(namespace, table)
}

fn notification(table: &str) -> ChangeNotification {
    ChangeNotification::for_table("main", qt("main", table))
}

/// A shared call-log for collecting callback invocations.
fn make_log() -> Arc<Mutex<Vec<ChangeNotification>>> {
    Arc::new(Mutex::new(Vec::new()))
}

// ============================================================================
// Fan-out
// ============================================================================

#[test]
fn publish_reaches_all_subscribers() {
    let notifier = EventNotifier::new();

    let log_a = make_log();
    let log_b = make_log();
    let a = Arc::clone(&log_a);
    let b = Arc::clone(&log_b);
    notifier.subscribe_to_data_changes(Arc::new(move |n: &ChangeNotification| a.lock().unwrap().push(n.clone())));
    notifier.subscribe_to_data_changes(Arc::new(move |n: &ChangeNotification| b.lock().unwrap().push(n.clone())));

    notifier.publish_data_changes(notification("person"));

    assert_eq!(log_a.lock().unwrap().len(), 1);
    assert_eq!(log_b.lock().unwrap().len(), 1);
}

#[test]
fn unsubscribe_stops_delivery() {
    let notifier = EventNotifier::new();

    let log = make_log();
    let l = Arc::clone(&log);
    let key = notifier.subscribe_to_data_changes(Arc::new(move |n: &ChangeNotification| {
        l.lock().unwrap().push(n.clone());
    }));

    notifier.publish_data_changes(notification("person"));
    notifier.unsubscribe_from_data_changes(key);
    notifier.publish_data_changes(notification("person"));

    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(notifier.subscriber_count(), 0);

    // Unknown keys are ignored.
    notifier.unsubscribe_from_data_changes(key);
    notifier.unsubscribe_from_data_changes(9999);
}

// ============================================================================
// Emission-round snapshot semantics
// ============================================================================

#[test]
fn listener_removed_during_a_round_still_fires_in_that_round() {
    let notifier = Arc::new(EventNotifier::new());

    let log_b = make_log();
    let key_b: Arc<Mutex<Option<SubscriptionKey>>> = Arc::new(Mutex::new(None));

    // First subscriber removes the second mid-round.
    let n = Arc::clone(&notifier);
    let kb = Arc::clone(&key_b);
    notifier.subscribe_to_data_changes(Arc::new(move |_| {
        if let Some(key) = kb.lock().unwrap().take() {
            n.unsubscribe_from_data_changes(key);
        }
    }));

    let b = Arc::clone(&log_b);
    let key = notifier.subscribe_to_data_changes(Arc::new(move |n: &ChangeNotification| {
        b.lock().unwrap().push(n.clone());
    }));
    *key_b.lock().unwrap() = Some(key);

    notifier.publish_data_changes(notification("person"));
    assert_eq!(log_b.lock().unwrap().len(), 1, "already-snapshotted listener fires");

    notifier.publish_data_changes(notification("person"));
    assert_eq!(log_b.lock().unwrap().len(), 1, "removed listener stays removed");
}

#[test]
fn listener_added_during_a_round_waits_for_the_next_one() {
    let notifier = Arc::new(EventNotifier::new());

    let log = make_log();
    let n = Arc::clone(&notifier);
    let l = Arc::clone(&log);
    let added = Arc::new(Mutex::new(false));
    let a = Arc::clone(&added);
    notifier.subscribe_to_data_changes(Arc::new(move |_| {
        let mut added = a.lock().unwrap();
        if !*added {
            *added = true;
            let inner = Arc::clone(&l);
            n.subscribe_to_data_changes(Arc::new(move |n: &ChangeNotification| {
                inner.lock().unwrap().push(n.clone());
            }));
        }
    }));

    notifier.publish_data_changes(notification("person"));
    assert_eq!(log.lock().unwrap().len(), 0, "not called in the registering round");

    notifier.publish_data_changes(notification("person"));
    assert_eq!(log.lock().unwrap().len(), 1);
}

// ============================================================================
// Alias translation
// ============================================================================

#[test]
fn alias_maps_attached_namespaces_to_logical_ones() {
    let notifier = EventNotifier::new();
    notifier.attach("att_db", "main");

    let raw = ChangeNotification::for_table("att_db", qt("att_db", "person"));
    assert_eq!(notifier.alias(&raw), vec![qt("main", "person")]);
}

#[test]
fn alias_passes_unattached_namespaces_through() {
    let notifier = EventNotifier::new();

    let raw = ChangeNotification::for_table("main", qt("main", "person"));
    assert_eq!(notifier.alias(&raw), vec![qt("main", "person")]);
}

#[test]
fn detach_restores_passthrough() {
    let notifier = EventNotifier::new();
    notifier.attach("att_db", "main");
    notifier.detach("att_db");

    let raw = ChangeNotification::for_table("att_db", qt("att_db", "person"));
    assert_eq!(notifier.alias(&raw), vec![qt("att_db", "person")]);
}

#[test]
fn alias_preserves_change_order_across_tables() {
    let notifier = EventNotifier::new();
    notifier.attach("att_db", "main");

    let raw = ChangeNotification::new(
        "att_db",
        vec![
            live_query::notifier::TableChange::new(qt("att_db", "person")),
            live_query::notifier::TableChange::new(qt("other", "club")),
        ],
    );
    assert_eq!(
        notifier.alias(&raw),
        vec![qt("main", "person"), qt("other", "club")]
    );
}
