//! Live queries — queries re-executed automatically when data they depend
//! on changes.
//!
//! # Overview
//!
//! [`LiveQuery<T>`] runs a [`QuerySource`] once eagerly, subscribes to a
//! [`Notifier`](crate::notifier::Notifier), and re-runs the source whenever
//! a notification touches one of the tables the previous run read from.
//! The latest value lives in an observable [`ResultData<T>`] slot, updated
//! via structural reconciliation.
//!
//! # Modules
//!
//! - [`source`] — the [`QuerySource<T>`] collaborator trait.
//! - [`state`] — the observable [`ResultData<T>`] slot.
//! - [`adapter`] — [`LiveQuery<T>`] itself.

pub mod adapter;
pub mod source;
pub mod state;

pub use adapter::{create_derived_query, create_live_query, LiveQuery, Unsubscribe};
pub use source::{FnSource, QuerySource, SourceFuture};
pub use state::ResultData;
