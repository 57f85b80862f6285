//! LiveQuery<T> — bridges a change [`Notifier`] to an observable query
//! result slot.
//!
//! # Lifecycle
//!
//! Creating a live query invokes its [`QuerySource`] once and subscribes to
//! the notifier immediately (not gated on the first resolution). Each
//! notification whose aliased table set intersects the recorded one
//! triggers exactly one re-invocation; each resolution replaces the slot
//! via structural reconciliation. Teardown — explicit
//! [`unsubscribe`](LiveQuery::unsubscribe) or `Drop` — releases the
//! subscription, after which no further invocations occur.
//!
//! # Ordering
//!
//! Invocations can overlap: a notification may trigger a refetch while an
//! earlier invocation is still in flight, and responses may resolve out of
//! order. Every invocation is tagged with a monotonically increasing
//! sequence number; a response that is no longer the latest issued one is
//! discarded wholesale — value and table set both — so a stale response can
//! never clobber a fresher one. Superseded invocations are not cancelled,
//! just ignored when they resolve.
//!
//! # Locking
//!
//! All slot and table-set decisions happen under one `parking_lot::Mutex`;
//! watcher callbacks fire only after it is released.
//!
//! Queries are spawned onto the ambient tokio runtime, so a `LiveQuery`
//! must be created from within one.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::{LiveQueryError, Result};
use crate::notifier::{ChangeNotification, EventEmitter, Notifier, SubscriptionKey};
use crate::reconcile::Reconcile;
use crate::types::{has_intersection, QualifiedTablename};

use super::source::QuerySource;
use super::state::ResultData;

/// An owned one-shot closure that releases a resource when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

// ============================================================================
// Internal state
// ============================================================================

struct QueryState<T> {
    data: ResultData<T>,
    /// Tables read by the most recently applied invocation. `None` until
    /// the first invocation of the current lifecycle resolves —
    /// intersection against an unset table set matches nothing, so earlier
    /// notifications are ignored.
    tablenames: Option<Vec<QualifiedTablename>>,
    /// Sequence of the most recently issued invocation.
    issued: u64,
    /// Lifecycle epoch — bumped by every rebind and by teardown, so a
    /// previous lifecycle's in-flight work can never publish.
    epoch: u64,
    disposed: bool,
}

struct Shared<T> {
    state: Mutex<QueryState<T>>,
    watchers: EventEmitter<ResultData<T>>,
}

impl<T> Shared<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueryState {
                data: ResultData::unset(),
                tablenames: None,
                issued: 0,
                epoch: 0,
                disposed: false,
            }),
            watchers: EventEmitter::new(),
        }
    }
}

// ============================================================================
// LiveQuery
// ============================================================================

/// An observable single-value container that always reflects the latest
/// successfully resolved result of its query source.
pub struct LiveQuery<T> {
    shared: Arc<Shared<T>>,
    notifier: Arc<dyn Notifier>,
    source: Mutex<Arc<dyn QuerySource<T>>>,
    subscription: Mutex<Option<SubscriptionKey>>,
}

impl<T> LiveQuery<T>
where
    T: Reconcile + Clone + Send + 'static,
{
    pub fn new(notifier: Arc<dyn Notifier>, source: Arc<dyn QuerySource<T>>) -> Self {
        let lq = Self {
            shared: Arc::new(Shared::new()),
            notifier,
            source: Mutex::new(source),
            subscription: Mutex::new(None),
        };
        lq.bind(0);
        lq
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Snapshot of the current slot.
    pub fn get(&self) -> ResultData<T> {
        self.shared.state.lock().data.clone()
    }

    /// The current result value, if the slot holds one.
    pub fn value(&self) -> Option<T> {
        self.shared.state.lock().data.results.clone()
    }

    /// Tables recorded by the most recently applied invocation.
    pub fn tablenames(&self) -> Option<Vec<QualifiedTablename>> {
        self.shared.state.lock().tablenames.clone()
    }

    /// Register `callback` to fire after every slot change (new value,
    /// reconciled difference, or error). Refreshes that reconcile to an
    /// unchanged value do not fire.
    ///
    /// Callbacks run outside all internal locks.
    pub fn watch(&self, callback: impl Fn(&ResultData<T>) + Send + Sync + 'static) -> Unsubscribe {
        let id = self.shared.watchers.on(callback);
        let shared = Arc::clone(&self.shared);
        Box::new(move || shared.watchers.off(id))
    }

    // -----------------------------------------------------------------------
    // Rebinding
    // -----------------------------------------------------------------------

    /// Swap in a new query source, starting a fresh lifecycle: the previous
    /// subscription is discarded, the new source runs once for an initial
    /// value, and a new subscription closes over the new source and the
    /// table set it reports.
    ///
    /// Anything still in flight from the previous lifecycle is never
    /// observed afterwards. Costs one extra round-trip per change.
    ///
    /// Returns [`LiveQueryError::Disposed`] after teardown.
    pub fn set_query(&self, source: Arc<dyn QuerySource<T>>) -> Result<()> {
        {
            let mut sub = self.subscription.lock();
            if let Some(key) = sub.take() {
                self.notifier.unsubscribe_from_data_changes(key);
            }
        }
        let epoch = {
            let mut st = self.shared.state.lock();
            if st.disposed {
                return Err(LiveQueryError::Disposed);
            }
            st.epoch += 1;
            st.tablenames = None;
            st.epoch
        };
        *self.source.lock() = source;
        self.bind(epoch);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// Run the current source once and subscribe for lifecycle `epoch`.
    fn bind(&self, epoch: u64) {
        let source = Arc::clone(&*self.source.lock());

        // Eager first run.
        Self::issue(&self.shared, &source, epoch);

        // Subscribe immediately — not gated on the first resolution.
        let shared = Arc::clone(&self.shared);
        let notifier = Arc::clone(&self.notifier);
        let key = self
            .notifier
            .subscribe_to_data_changes(Arc::new(move |notification: &ChangeNotification| {
                let changed = notifier.alias(notification);
                let seq = {
                    let mut st = shared.state.lock();
                    if st.disposed || st.epoch != epoch {
                        return;
                    }
                    match &st.tablenames {
                        Some(tables) if has_intersection(&changed, tables) => {
                            st.issued += 1;
                            st.issued
                        }
                        _ => return,
                    }
                };
                Self::run(Arc::clone(&shared), Arc::clone(&source), epoch, seq);
            }));
        *self.subscription.lock() = Some(key);
    }

    /// Allocate the next sequence number and run the source with it.
    fn issue(shared: &Arc<Shared<T>>, source: &Arc<dyn QuerySource<T>>, epoch: u64) {
        let seq = {
            let mut st = shared.state.lock();
            if st.disposed || st.epoch != epoch {
                return;
            }
            st.issued += 1;
            st.issued
        };
        Self::run(Arc::clone(shared), Arc::clone(source), epoch, seq);
    }

    fn run(shared: Arc<Shared<T>>, source: Arc<dyn QuerySource<T>>, epoch: u64, seq: u64) {
        tokio::spawn(async move {
            let outcome = source.run().await;
            let snapshot = {
                let mut st = shared.state.lock();
                // A response that is not the latest issued invocation of
                // the current lifecycle is stale: drop it, value and table
                // set both.
                if st.disposed || st.epoch != epoch || st.issued != seq {
                    return;
                }
                match outcome {
                    Ok(live) => {
                        st.tablenames = Some(live.tablenames);
                        let value_changed = match st.data.results.as_mut() {
                            Some(slot) => slot.reconcile(live.result),
                            None => {
                                st.data.results = Some(live.result);
                                true
                            }
                        };
                        let error_cleared = st.data.error.take().is_some();
                        st.data.updated_at = Some(SystemTime::now());
                        if value_changed || error_cleared {
                            Some(st.data.clone())
                        } else {
                            None
                        }
                    }
                    Err(e) => {
                        // Surface the failure in place of a value. No
                        // automatic retry — the next relevant notification
                        // or rebind runs the query again.
                        st.data.results = None;
                        st.data.error = Some(Arc::new(LiveQueryError::Query(e)));
                        st.data.updated_at = Some(SystemTime::now());
                        Some(st.data.clone())
                    }
                }
            };
            if let Some(data) = snapshot {
                shared.watchers.emit(&data);
            }
        });
    }
}

impl<T> LiveQuery<T> {
    /// Tear down: after this returns, no further invocations of the query
    /// source occur, regardless of pending notifications, and anything
    /// still in flight is discarded.
    pub fn unsubscribe(&self) {
        {
            let mut st = self.shared.state.lock();
            st.disposed = true;
            st.epoch += 1;
        }
        if let Some(key) = self.subscription.lock().take() {
            self.notifier.unsubscribe_from_data_changes(key);
        }
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Create a live query over a fixed query source.
pub fn create_live_query<T>(
    notifier: Arc<dyn Notifier>,
    source: Arc<dyn QuerySource<T>>,
) -> LiveQuery<T>
where
    T: Reconcile + Clone + Send + 'static,
{
    LiveQuery::new(notifier, source)
}

/// Create a live query whose source is expected to change over time (for
/// example because it closes over a sort order or a search filter).
///
/// This is the same primitive as [`create_live_query`]; the caller rebinds
/// via [`LiveQuery::set_query`] whenever its parameters change, which
/// starts a fresh lifecycle per change.
pub fn create_derived_query<T>(
    notifier: Arc<dyn Notifier>,
    source: Arc<dyn QuerySource<T>>,
) -> LiveQuery<T>
where
    T: Reconcile + Clone + Send + 'static,
{
    LiveQuery::new(notifier, source)
}
