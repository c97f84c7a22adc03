//! Error types for the typed `SQLite` store.

use std::fmt;

use thiserror::Error;

use crate::value::TypeMismatch;

/// Error returned by store and statement operations.
///
/// `Connection` and `Query` refine the generic `Storage` failure. Their
/// display form prefixes a fixed label onto the engine message, and callers
/// match on that text, so the labels must not change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Generic storage failure, e.g. a value extracted as the wrong kind.
    #[error("{0}")]
    Storage(String),

    /// The store is closed or the database file could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed SQL, bind index violation, constraint violation or a
    /// busy/locked engine.
    #[error("Query error: {0}")]
    Query(String),
}

impl StoreError {
    /// Returns `true` for connection failures.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` for query failures.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns the underlying message without the label prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Storage(msg) | Self::Connection(msg) | Self::Query(msg) => msg,
        }
    }

    pub(crate) fn not_open() -> Self {
        Self::Connection("Database not open".to_string())
    }
}

impl From<TypeMismatch> for StoreError {
    fn from(err: TypeMismatch) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Raw result code reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EngineCode(pub i32);

impl fmt::Display for EngineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure reported by a raw engine call, before it is classified.
#[derive(Debug)]
pub(crate) struct EngineError {
    pub code: EngineCode,
    pub message: String,
}

impl EngineError {
    pub(crate) fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: EngineCode(code),
            message: message.into(),
        }
    }

    /// Classifies as a query failure, prefixing the failing operation.
    pub(crate) fn into_query(self, context: &str) -> StoreError {
        tracing::trace!(code = %self.code, "{context} failed");
        StoreError::Query(format!("{context}: {}", self.message))
    }

    /// Classifies as a query failure carrying the bare engine message.
    pub(crate) fn into_bare_query(self) -> StoreError {
        tracing::trace!(code = %self.code, "exec failed");
        StoreError::Query(self.message)
    }

    /// Classifies as a connection failure.
    pub(crate) fn into_connection(self) -> StoreError {
        tracing::trace!(code = %self.code, "open failed");
        StoreError::Connection(self.message)
    }
}
