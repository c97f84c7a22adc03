//! Engine-agnostic store and statement interfaces.
//!
//! Repositories program against these traits; [`SqliteStore`](crate::SqliteStore)
//! and [`SqliteStatement`](crate::SqliteStatement) are the concrete adapter.

use std::path::Path;

use super::error::StoreResult;
use super::value::{Rows, Value};

/// A compiled, parameter-bindable, reusable query.
pub trait PreparedStatement {
    /// Binds `value` to the 1-based parameter `index`.
    ///
    /// Returns `&mut Self` so binds can be chained:
    /// `stmt.bind(1, 7_i64)?.bind(2, "seven")?;`
    ///
    /// # Errors
    ///
    /// Returns a query error if `index` is 0 or larger than the statement's
    /// parameter count.
    fn bind<V: Into<Value>>(&mut self, index: usize, value: V) -> StoreResult<&mut Self>;

    /// Runs the statement to completion and collects every produced row.
    ///
    /// Statements that produce no rows return an empty [`Rows`].
    ///
    /// # Errors
    ///
    /// Returns a query error if the engine rejects the statement.
    fn execute(&mut self) -> StoreResult<Rows>;

    /// Runs an INSERT and returns the row id the engine assigned.
    ///
    /// # Errors
    ///
    /// Returns a query error on constraint violations and other engine errors.
    fn execute_insert(&mut self) -> StoreResult<i64>;

    /// Runs an INSERT/UPDATE/DELETE and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns a query error on constraint violations and other engine errors.
    fn execute_update(&mut self) -> StoreResult<usize>;

    /// Rewinds the cursor and clears all bindings so the compiled plan can be
    /// reused with new values.
    fn reset(&mut self);
}

/// An open handle to one database file or in-memory instance.
pub trait Store {
    /// Statement type produced by [`Store::prepare`]. Borrows the store.
    type Statement<'a>: PreparedStatement
    where
        Self: 'a;

    /// Opens `path`, closing any connection already held.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the database cannot be opened; the store
    /// is left closed.
    fn open<P: AsRef<Path>>(&mut self, path: P) -> StoreResult<()>;

    /// Closes the connection. Calling it on a closed store is a no-op.
    fn close(&mut self);

    /// Returns `true` while a connection is held.
    fn is_open(&self) -> bool;

    /// Compiles `sql` into a reusable statement.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store, or a query error if the
    /// SQL does not parse.
    fn prepare(&self, sql: &str) -> StoreResult<Self::Statement<'_>>;

    /// Runs non-parameterized SQL, discarding any rows.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store, or a query error on
    /// syntax or constraint failures.
    fn execute(&self, sql: &str) -> StoreResult<()>;

    /// Prepares and runs `sql`, returning every row.
    ///
    /// # Errors
    ///
    /// See [`Store::prepare`] and [`PreparedStatement::execute`].
    fn query(&self, sql: &str) -> StoreResult<Rows> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute()
    }

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns a query error if a transaction is already active.
    fn begin_transaction(&self) -> StoreResult<()>;

    /// Commits the active transaction.
    ///
    /// # Errors
    ///
    /// Returns a query error if no transaction is active or the commit fails.
    fn commit(&self) -> StoreResult<()>;

    /// Rolls back the active transaction.
    ///
    /// # Errors
    ///
    /// Returns a query error if no transaction is active.
    fn rollback(&self) -> StoreResult<()>;

    /// Row id of the most recent successful INSERT; 0 on a closed store.
    fn last_insert_row_id(&self) -> i64;

    /// Rows affected by the most recent statement; 0 on a closed store.
    fn changes_count(&self) -> usize;
}
