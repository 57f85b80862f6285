//! Structural reconciliation — replace a value by mutating only the parts
//! that actually differ.
//!
//! When a live query refetches, the new result usually overlaps heavily with
//! the previous one. Overwriting the whole slot would make every downstream
//! consumer re-process everything; reconciling instead patches objects
//! key-by-key and arrays element-by-element, leaving equal substructures
//! untouched, and reports whether anything changed at all.

use serde_json::Value;

/// Nesting bound for the recursive walk. Past this depth values are
/// replaced wholesale instead of patched.
const MAX_RECONCILE_DEPTH: usize = 100;

// ============================================================================
// Reconcile
// ============================================================================

/// Replace `self` with `next` by mutating only the differing parts.
///
/// Returns `true` iff anything changed; reconciling against a structurally
/// equal value is a no-op and returns `false`.
pub trait Reconcile {
    fn reconcile(&mut self, next: Self) -> bool;
}

impl Reconcile for Value {
    fn reconcile(&mut self, next: Self) -> bool {
        reconcile_value(self, next, 0)
    }
}

impl<T: Reconcile> Reconcile for Vec<T> {
    fn reconcile(&mut self, next: Self) -> bool {
        let mut changed = false;
        if next.len() < self.len() {
            self.truncate(next.len());
            changed = true;
        }
        let mut incoming = next.into_iter();
        for (slot, item) in self.iter_mut().zip(&mut incoming) {
            changed |= slot.reconcile(item);
        }
        for item in incoming {
            self.push(item);
            changed = true;
        }
        changed
    }
}

impl<T: Reconcile> Reconcile for Option<T> {
    fn reconcile(&mut self, next: Self) -> bool {
        match (&mut *self, next) {
            (Some(slot), Some(item)) => slot.reconcile(item),
            (None, None) => false,
            (slot, next) => {
                *slot = next;
                true
            }
        }
    }
}

macro_rules! reconcile_by_replace {
    ($($ty:ty),* $(,)?) => {$(
        impl Reconcile for $ty {
            fn reconcile(&mut self, next: Self) -> bool {
                if *self != next {
                    *self = next;
                    true
                } else {
                    false
                }
            }
        }
    )*};
}

reconcile_by_replace!(String, bool, i64, u64, i32, u32, usize, f64);

// ============================================================================
// Value walk
// ============================================================================

fn reconcile_value(slot: &mut Value, next: Value, depth: usize) -> bool {
    if depth >= MAX_RECONCILE_DEPTH {
        return replace_if_changed(slot, next);
    }

    match (slot, next) {
        (Value::Object(old), Value::Object(new)) => {
            let mut changed = false;
            // Keys that vanished from the new value are removed.
            old.retain(|key, _| {
                if new.contains_key(key) {
                    true
                } else {
                    changed = true;
                    false
                }
            });
            for (key, value) in new {
                match old.get_mut(&key) {
                    Some(existing) => changed |= reconcile_value(existing, value, depth + 1),
                    None => {
                        old.insert(key, value);
                        changed = true;
                    }
                }
            }
            changed
        }

        (Value::Array(old), Value::Array(new)) => {
            let mut changed = false;
            if new.len() < old.len() {
                old.truncate(new.len());
                changed = true;
            }
            let mut incoming = new.into_iter();
            for (slot, item) in old.iter_mut().zip(&mut incoming) {
                changed |= reconcile_value(slot, item, depth + 1);
            }
            for item in incoming {
                old.push(item);
                changed = true;
            }
            changed
        }

        (slot, next) => replace_if_changed(slot, next),
    }
}

fn replace_if_changed(slot: &mut Value, next: Value) -> bool {
    if *slot != next {
        *slot = next;
        true
    } else {
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
