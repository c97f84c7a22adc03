//! Scope-bound transaction guard.

use std::ops::Deref;

use tracing::warn;

use super::error::StoreResult;
use super::traits::Store;

/// An open database transaction.
///
/// Begins on construction. Automatically rolls back on drop unless
/// [`commit`](Self::commit) or [`rollback`](Self::rollback) was called, so an
/// early `?` return undoes every write made through the store since `begin`.
///
/// Dereferences to the store, so statements can be prepared and executed
/// through the guard.
pub struct Transaction<'s, S: Store> {
    store: &'s S,
    finished: bool,
}

impl<'s, S: Store> Transaction<'s, S> {
    /// Begins a new transaction on `store`.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store, or a query error if a
    /// transaction is already active (guards do not nest).
    pub fn begin(store: &'s S) -> StoreResult<Self> {
        store.begin_transaction()?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the commit fails; the guard then rolls
    /// back when dropped.
    pub fn commit(mut self) -> StoreResult<()> {
        self.store.commit()?;
        self.finished = true;
        Ok(())
    }

    /// Rolls back the transaction explicitly, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the rollback fails.
    pub fn rollback(mut self) -> StoreResult<()> {
        self.finished = true;
        self.store.rollback()
    }
}

impl<S: Store> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: Store> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            // Best-effort rollback.
            if let Err(err) = self.store.rollback() {
                warn!(error = %err, "implicit rollback failed");
            }
        }
    }
}

impl<S: Store> std::fmt::Debug for Transaction<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
