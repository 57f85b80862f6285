pub mod error;
pub mod live;
pub mod notifier;
pub mod reconcile;
pub mod types;
