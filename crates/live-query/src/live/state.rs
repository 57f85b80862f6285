//! The observable single-slot container a live query publishes into.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::LiveQueryError;

/// Snapshot of a live query's slot.
///
/// Starts unset (`results` and `error` both `None`) until the first
/// invocation resolves; consumers must tolerate that state. A failed
/// invocation surfaces as `error` in place of a value — the slot never
/// holds both at once.
#[derive(Debug, Clone)]
pub struct ResultData<T> {
    pub results: Option<T>,
    pub error: Option<Arc<LiveQueryError>>,
    /// When the slot last finished applying an invocation, including
    /// refreshes that reconciled to an unchanged value.
    pub updated_at: Option<SystemTime>,
}

impl<T> ResultData<T> {
    pub fn unset() -> Self {
        Self {
            results: None,
            error: None,
            updated_at: None,
        }
    }

    /// True until the first invocation has resolved (successfully or not).
    pub fn is_unset(&self) -> bool {
        self.results.is_none() && self.error.is_none()
    }
}

impl<T> Default for ResultData<T> {
    fn default() -> Self {
        Self::unset()
    }
}
