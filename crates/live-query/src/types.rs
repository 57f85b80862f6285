//! Core value types: qualified table names, query results, and the
//! intersection test that gates change relevance.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// QualifiedTablename
// ============================================================================

/// A namespace-qualified name identifying one logical data table.
///
/// Equality comparison on the full pair is what decides whether a change
/// notification is relevant to a live query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedTablename {
    pub namespace: String,
    pub tablename: String,
}

impl QualifiedTablename {
    pub fn new(namespace: impl Into<String>, tablename: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            tablename: tablename.into(),
        }
    }
}

impl fmt::Display for QualifiedTablename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.tablename)
    }
}

// ============================================================================
// Intersection test
// ============================================================================

/// True iff the two table sets share at least one element.
///
/// Duplicates and ordering are irrelevant; empty input on either side is
/// always disjoint.
pub fn has_intersection(a: &[QualifiedTablename], b: &[QualifiedTablename]) -> bool {
    a.iter().any(|t| b.contains(t))
}

// ============================================================================
// LiveResult
// ============================================================================

/// The pair produced by one query invocation: the result value plus the
/// tables the query read from.
///
/// The table names are what a live query subscribes against in order to
/// re-run when one of those tables changes. Produced fresh on every
/// invocation; never cached beyond the single latest slot.
#[derive(Debug, Clone)]
pub struct LiveResult<T> {
    pub result: T,
    pub tablenames: Vec<QualifiedTablename>,
}

impl<T> LiveResult<T> {
    pub fn new(result: T, tablenames: Vec<QualifiedTablename>) -> Self {
        Self { result, tablenames }
    }
}

// ============================================================================
// Tests
// ============================================================================
