//! Multi-row helpers: one compiled statement, many parameter sets, one
//! transaction.
//!
//! Every helper either applies all of its parameter sets or, on the first
//! failure, none of them: the [`Transaction`](crate::Transaction) guard rolls
//! back when the error propagates out of the loop.

use tracing::debug;

use super::connection::SqliteStore;
use super::error::StoreResult;
use super::traits::{PreparedStatement, Store};
use super::value::{Rows, Value};

impl SqliteStore {
    /// Inserts `rows` into `table`, binding each row's values to `columns` in
    /// order. Returns the number of rows inserted.
    ///
    /// `table` and `columns` are spliced into the SQL verbatim and must come
    /// from trusted code, not user input. Empty `rows` returns 0 without
    /// touching the database.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no row from this call is left behind.
    pub fn bulk_insert<C, R>(&self, table: &str, columns: &[C], rows: &[R]) -> StoreResult<usize>
    where
        C: AsRef<str>,
        R: AsRef<[Value]>,
    {
        if rows.is_empty() {
            return Ok(0);
        }
        let total = self.bulk_execute(&insert_sql(table, columns), rows)?;
        debug!(table, rows = total, "bulk insert complete");
        Ok(total)
    }

    /// Runs parameterized `sql` once per parameter set inside one transaction.
    /// Returns the total number of affected rows. `sql` must not produce rows
    /// and each set must supply exactly one value per placeholder.
    ///
    /// Empty `param_sets` returns 0 without touching the database.
    ///
    /// # Errors
    ///
    /// Returns the first failure; every set applied before it is rolled back.
    pub fn bulk_execute<R: AsRef<[Value]>>(&self, sql: &str, param_sets: &[R]) -> StoreResult<usize> {
        if param_sets.is_empty() {
            return Ok(0);
        }
        let mut stmt = self.prepare(sql)?;
        let tx = self.transaction()?;
        let total = stmt.execute_batch(param_sets)?;
        tx.commit()?;
        debug!(sets = param_sets.len(), affected = total, "bulk execute complete");
        Ok(total)
    }

    /// Runs parameterized query `sql` once per parameter set and concatenates
    /// the rows, in parameter-set order. Each set must supply exactly one
    /// value per placeholder.
    ///
    /// Empty `param_sets` returns no rows without touching the database.
    ///
    /// # Errors
    ///
    /// Returns the first failure.
    pub fn bulk_select<R: AsRef<[Value]>>(&self, sql: &str, param_sets: &[R]) -> StoreResult<Rows> {
        if param_sets.is_empty() {
            return Ok(Rows::new());
        }
        let mut stmt = self.prepare(sql)?;
        let tx = self.transaction()?;
        let mut combined = Rows::new();
        for params in param_sets {
            stmt.rebind(params.as_ref(), "execute")?;
            combined.extend(stmt.execute()?);
        }
        tx.commit()?;
        debug!(sets = param_sets.len(), rows = combined.len(), "bulk select complete");
        Ok(combined)
    }
}

/// Builds `INSERT INTO table (c1, c2) VALUES (?, ?)`.
fn insert_sql<C: AsRef<str>>(table: &str, columns: &[C]) -> String {
    let names: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
    let placeholders = vec!["?"; columns.len()];
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::insert_sql;

    #[test]
    fn test_insert_sql_has_one_placeholder_per_column() {
        assert_eq!(
            insert_sql("t", &["a", "b", "c"]),
            "INSERT INTO t (a, b, c) VALUES (?, ?, ?)"
        );
        assert_eq!(insert_sql("t", &["v"]), "INSERT INTO t (v) VALUES (?)");
    }
}
