//! Connection options applied each time a store is opened.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// `SQLite` rollback journal mode, set with `PRAGMA journal_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Delete the rollback journal at the end of each transaction.
    Delete,
    /// Truncate the rollback journal to zero length instead of deleting it.
    Truncate,
    /// Keep the journal file and zero its header.
    Persist,
    /// Keep the rollback journal in memory.
    Memory,
    /// Write-ahead log: one writer and many concurrent readers.
    Wal,
    /// No rollback journal. Transactions cannot be rolled back reliably.
    Off,
}

/// Options applied by [`SqliteStore`](crate::SqliteStore) on every open.
///
/// Deserializable so a host application can embed it in its own config:
///
/// ```
/// # use quantalox_db::{JournalMode, StoreOptions};
/// let opts: StoreOptions = serde_json::from_str(r#"{ "journal_mode": "wal" }"#).unwrap();
/// assert!(opts.foreign_keys);
/// assert_eq!(opts.journal_mode, Some(JournalMode::Wal));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Enforce `FOREIGN KEY` constraints.
    pub foreign_keys: bool,
    /// Journal mode to select after opening; `None` keeps the engine default.
    pub journal_mode: Option<JournalMode>,
    /// Open without write access. The file must already exist.
    pub read_only: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            journal_mode: None,
            read_only: false,
        }
    }
}

impl StoreOptions {
    /// Sets whether foreign keys are enforced.
    #[must_use]
    pub const fn foreign_keys(mut self, enable: bool) -> Self {
        self.foreign_keys = enable;
        self
    }

    /// Sets the journal mode.
    #[must_use]
    pub const fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.journal_mode = Some(mode);
        self
    }

    /// Opens read-only.
    #[must_use]
    pub const fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_defaults_enforce_foreign_keys() {
        let opts = StoreOptions::default();
        assert!(opts.foreign_keys);
        assert!(!opts.read_only);
        assert_eq!(opts.journal_mode, None);
    }

    #[test]
    fn test_journal_mode_pragma_spelling() {
        assert_eq!(JournalMode::Wal.to_string(), "WAL");
        assert_eq!(JournalMode::Truncate.to_string(), "TRUNCATE");
        assert_eq!(JournalMode::from_str("wal"), Ok(JournalMode::Wal));
        assert!(JournalMode::from_str("bogus").is_err());
    }

    #[test]
    fn test_deserialize_partial_options() {
        let opts: StoreOptions =
            serde_json::from_str(r#"{ "foreign_keys": false, "journal_mode": "memory" }"#)
                .expect("parse options");
        assert_eq!(
            opts,
            StoreOptions::default()
                .foreign_keys(false)
                .journal_mode(JournalMode::Memory)
        );
    }
}
