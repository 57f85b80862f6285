//! The query-invocation collaborator.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::QueryError;
use crate::types::LiveResult;

/// A query invocation function: each call runs the query once against
/// current data and reports the value read together with the tables it
/// touched.
///
/// Implementations are supplied by the database client layer. A source is
/// invoked zero-argument and owns whatever parameters it closes over
/// (filters, sort order); changing parameters means binding a *new* source,
/// not mutating an existing one.
#[async_trait]
pub trait QuerySource<T>: Send + Sync {
    async fn run(&self) -> Result<LiveResult<T>, QueryError>;
}

/// Boxed future returned by closure-backed sources.
pub type SourceFuture<T> = Pin<Box<dyn Future<Output = Result<LiveResult<T>, QueryError>> + Send>>;

/// [`QuerySource`] adapter for a plain closure.
pub struct FnSource<T> {
    f: Box<dyn Fn() -> SourceFuture<T> + Send + Sync>,
}

impl<T> FnSource<T> {
    pub fn new(f: impl Fn() -> SourceFuture<T> + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

#[async_trait]
impl<T: Send> QuerySource<T> for FnSource<T> {
    async fn run(&self) -> Result<LiveResult<T>, QueryError> {
        (self.f)().await
    }
}
