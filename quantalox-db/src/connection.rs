//! Safe wrapper around a `SQLite` database connection.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawDb`] which encapsulates the raw pointers and C type conversions.

use std::path::Path;

use tracing::{debug, trace};

use super::error::{StoreError, StoreResult};
use super::ffi::{self, RawDb};
use super::options::{JournalMode, StoreOptions};
use super::statement::SqliteStatement;
use super::traits::Store;
use super::transaction::Transaction;

/// Path that opens a private, ephemeral in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// A `SQLite` store: at most one open connection plus the options applied to
/// it on every open.
///
/// Starts closed ([`SqliteStore::new`]) or open ([`SqliteStore::connect`]).
/// Closed when dropped. `Send` but not `Sync`: all access must happen from a
/// single thread at a time.
///
/// Taking a store out with [`std::mem::take`] leaves a closed store behind.
#[derive(Default)]
pub struct SqliteStore {
    db: Option<RawDb>,
    options: StoreOptions,
}

impl SqliteStore {
    /// Creates a closed store with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed store that applies `options` on every open.
    #[must_use]
    pub const fn with_options(options: StoreOptions) -> Self {
        Self { db: None, options }
    }

    /// Opens (or creates) a database at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the database cannot be opened.
    pub fn connect<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut store = Self::new();
        store.open(path)?;
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the engine cannot allocate it.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::connect(IN_MEMORY)
    }

    /// Returns the options applied on open.
    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Begins a [`Transaction`] guard that rolls back unless committed.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store, or a query error if a
    /// transaction is already active.
    pub fn transaction(&self) -> StoreResult<Transaction<'_, Self>> {
        Transaction::begin(self)
    }

    /// Turns foreign key enforcement on or off for this connection.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store.
    pub fn enable_foreign_keys(&self, enable: bool) -> StoreResult<()> {
        self.execute(if enable {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        })
    }

    /// Selects the journal mode for this connection.
    ///
    /// # Errors
    ///
    /// Returns a connection error on a closed store, or a query error if the
    /// engine refuses the change.
    pub fn set_journal_mode(&self, mode: JournalMode) -> StoreResult<()> {
        self.execute(&format!("PRAGMA journal_mode = {mode}"))
    }

    fn raw(&self) -> StoreResult<&RawDb> {
        self.db.as_ref().ok_or_else(StoreError::not_open)
    }

    fn configure(&self) -> StoreResult<()> {
        self.enable_foreign_keys(self.options.foreign_keys)?;
        if let Some(mode) = self.options.journal_mode {
            self.set_journal_mode(mode)?;
        }
        Ok(())
    }

    const fn open_flags(&self) -> i32 {
        if self.options.read_only {
            ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_FULLMUTEX
        } else {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE | ffi::SQLITE_OPEN_FULLMUTEX
        }
    }
}

impl Store for SqliteStore {
    type Statement<'a> = SqliteStatement<'a>;

    fn open<P: AsRef<Path>>(&mut self, path: P) -> StoreResult<()> {
        self.close();

        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        let db = RawDb::open(&path_str, self.open_flags()).map_err(|e| e.into_connection())?;
        self.db = Some(db);

        if let Err(err) = self.configure() {
            self.close();
            return Err(StoreError::Connection(err.message().to_string()));
        }
        debug!(path = %path.display(), "opened store");
        Ok(())
    }

    fn close(&mut self) {
        if self.db.take().is_some() {
            debug!("closed store");
        }
    }

    fn is_open(&self) -> bool {
        self.db.is_some()
    }

    fn prepare(&self, sql: &str) -> StoreResult<SqliteStatement<'_>> {
        let db = self.raw()?;
        trace!(sql, "preparing statement");
        let raw = db.prepare(sql).map_err(|e| e.into_query("prepare statement"))?;
        Ok(SqliteStatement::new(raw))
    }

    fn execute(&self, sql: &str) -> StoreResult<()> {
        self.raw()?.exec(sql).map_err(|e| e.into_bare_query())
    }

    fn begin_transaction(&self) -> StoreResult<()> {
        self.execute("BEGIN TRANSACTION")?;
        debug!("transaction started");
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        self.execute("COMMIT")?;
        debug!("transaction committed");
        Ok(())
    }

    fn rollback(&self) -> StoreResult<()> {
        self.execute("ROLLBACK")?;
        debug!("transaction rolled back");
        Ok(())
    }

    fn last_insert_row_id(&self) -> i64 {
        self.db.as_ref().map_or(0, RawDb::last_insert_rowid)
    }

    fn changes_count(&self) -> usize {
        self.db
            .as_ref()
            .map_or(0, |db| usize::try_from(db.changes()).unwrap_or(0))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("open", &self.is_open())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
