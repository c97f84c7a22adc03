//! Safe wrapper around a `SQLite` prepared statement.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawStmt`] which encapsulates the raw pointers and C type conversions.

use std::os::raw::c_int;

use super::error::{StoreError, StoreResult};
use super::ffi::{self, RawStmt};
use super::traits::PreparedStatement;
use super::value::{Row, Rows, Value};

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepResult {
    /// A result row is available.
    Row,
    /// The statement has finished executing.
    Done,
}

/// A prepared `SQLite` statement.
///
/// Created via [`SqliteStore::prepare`](crate::Store::prepare).
/// Tied to the lifetime of the store that created it.
/// Finalized when dropped.
pub struct SqliteStatement<'conn> {
    raw: RawStmt<'conn>,
}

impl<'conn> SqliteStatement<'conn> {
    /// Wraps a raw statement handle.
    pub(super) const fn new(raw: RawStmt<'conn>) -> Self {
        Self { raw }
    }

    /// Number of `?` placeholders in the statement.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        usize::try_from(self.raw.parameter_count()).unwrap_or(0)
    }

    /// Number of columns each result row has.
    #[must_use]
    pub fn column_count(&self) -> usize {
        usize::try_from(self.raw.column_count()).unwrap_or(0)
    }

    /// Name of result column `idx` (0-based), or `None` if out of range.
    #[must_use]
    pub fn column_name(&self, idx: usize) -> Option<String> {
        if idx >= self.column_count() {
            return None;
        }
        let col = c_int::try_from(idx).ok()?;
        Some(self.raw.column_name(col))
    }

    /// Binds `values` to parameters `1..=values.len()` in order.
    ///
    /// # Errors
    ///
    /// Returns a query error if there are more values than placeholders.
    pub fn bind_all(&mut self, values: &[Value]) -> StoreResult<&mut Self> {
        for (i, value) in values.iter().enumerate() {
            self.bind_value(i + 1, value)?;
        }
        Ok(self)
    }

    /// Runs the statement once per parameter set and returns the total number
    /// of affected rows.
    ///
    /// Each set is bound positionally after a [`reset`](PreparedStatement::reset),
    /// so the compiled plan is reused. Every set must supply exactly
    /// [`parameter_count`](Self::parameter_count) values, and the statement
    /// must not produce rows. Run this inside a
    /// [`Transaction`](crate::Transaction): without one, a failure part-way
    /// leaves the earlier sets applied.
    ///
    /// # Errors
    ///
    /// Returns the first query error; later sets are not attempted.
    pub fn execute_batch<P: AsRef<[Value]>>(&mut self, param_sets: &[P]) -> StoreResult<usize> {
        let mut total = 0;
        for params in param_sets {
            self.rebind(params.as_ref(), "executeBatch")?;
            if self.step("executeBatch")? == StepResult::Row {
                self.reset();
                return Err(StoreError::Query(
                    "executeBatch: statement returned rows".to_string(),
                ));
            }
            total += self.changes();
        }
        Ok(total)
    }

    /// Resets the statement and binds one complete parameter set.
    ///
    /// A set whose length differs from the placeholder count is rejected
    /// before anything is bound.
    pub(super) fn rebind(&mut self, values: &[Value], context: &str) -> StoreResult<()> {
        let expected = self.parameter_count();
        if values.len() != expected {
            return Err(StoreError::Query(format!(
                "{context}: expected {expected} parameters, got {}",
                values.len()
            )));
        }
        self.reset();
        self.bind_all(values)?;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn bind_value(&mut self, index: usize, value: &Value) -> StoreResult<()> {
        let context = match value {
            Value::Null => "bind null",
            Value::Integer(_) => "bind int64",
            Value::Real(_) => "bind double",
            Value::Text(_) => "bind text",
            Value::Blob(_) => "bind blob",
        };
        let idx = c_int::try_from(index).map_err(|_| {
            StoreError::Query(format!("{context}: parameter index {index} out of range"))
        })?;
        match value {
            Value::Null => self.raw.bind_null(idx),
            Value::Integer(v) => self.raw.bind_i64(idx, *v),
            Value::Real(v) => self.raw.bind_f64(idx, *v),
            Value::Text(v) => self.raw.bind_text(idx, v),
            Value::Blob(v) => self.raw.bind_blob(idx, v),
        }
        .map_err(|e| e.into_query(context))
    }

    fn step(&mut self, context: &str) -> StoreResult<StepResult> {
        let rc = self.raw.step().map_err(|e| e.into_query(context))?;
        if rc == ffi::SQLITE_ROW {
            Ok(StepResult::Row)
        } else {
            Ok(StepResult::Done)
        }
    }

    fn changes(&self) -> usize {
        usize::try_from(self.raw.changes()).unwrap_or(0)
    }

    fn read_row(&self) -> Row {
        (0..self.raw.column_count()).map(|col| self.column_value(col)).collect()
    }

    fn column_value(&self, col: c_int) -> Value {
        match self.raw.column_type(col) {
            ffi::SQLITE_INTEGER => Value::Integer(self.raw.column_i64(col)),
            ffi::SQLITE_FLOAT => Value::Real(self.raw.column_f64(col)),
            ffi::SQLITE_TEXT => Value::Text(self.raw.column_text(col)),
            ffi::SQLITE_BLOB => Value::Blob(self.raw.column_blob(col)),
            ffi::SQLITE_NULL => Value::Null,
            other => {
                tracing::warn!(column = col, code = other, "unknown column type, reading as NULL");
                Value::Null
            }
        }
    }
}

impl PreparedStatement for SqliteStatement<'_> {
    fn bind<V: Into<Value>>(&mut self, index: usize, value: V) -> StoreResult<&mut Self> {
        self.bind_value(index, &value.into())?;
        Ok(self)
    }

    fn execute(&mut self) -> StoreResult<Rows> {
        let mut rows = Vec::new();
        while self.step("execute")? == StepResult::Row {
            rows.push(self.read_row());
        }
        Ok(rows)
    }

    fn execute_insert(&mut self) -> StoreResult<i64> {
        self.step("executeInsert")?;
        Ok(self.raw.last_insert_rowid())
    }

    fn execute_update(&mut self) -> StoreResult<usize> {
        self.step("executeUpdate")?;
        Ok(self.changes())
    }

    fn reset(&mut self) {
        self.raw.reset();
    }
}

impl std::fmt::Debug for SqliteStatement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStatement")
            .field("parameters", &self.parameter_count())
            .field("columns", &self.column_count())
            .finish_non_exhaustive()
    }
}
