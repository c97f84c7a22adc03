//! Typed data-access layer over an embedded `SQLite` store.
//!
//! Repositories open a [`SqliteStore`], prepare [`SqliteStatement`]s, bind
//! [`Value`]s and read back [`Rows`]. Groups of writes are made atomic with a
//! [`Transaction`] guard, which rolls back on drop unless committed, and the
//! bulk helpers ([`SqliteStore::bulk_insert`], [`SqliteStore::bulk_execute`],
//! [`SqliteStore::bulk_select`]) run one compiled statement over many
//! parameter sets inside one transaction.
//!
//! ```
//! use quantalox_db::{params, PreparedStatement, SqliteStore, Store, Value};
//!
//! # fn main() -> Result<(), quantalox_db::StoreError> {
//! let store = SqliteStore::open_in_memory()?;
//! store.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT)")?;
//! store.bulk_insert("t", &["v"], &[params!["a"], params!["b"]])?;
//!
//! let mut stmt = store.prepare("SELECT v FROM t WHERE id = ?")?;
//! stmt.bind(1, 2_i64)?;
//! assert_eq!(stmt.execute()?, vec![vec![Value::from("b")]]);
//! # Ok(())
//! # }
//! ```
//!
//! The engine symbols come from `libsqlite3-sys` (bundled amalgamation). The
//! `ffi` module is the **only** file that contains `unsafe` code or C types;
//! everything else uses the safe types defined here.

mod ffi;

mod bulk;
mod connection;
pub mod error;
pub mod options;
mod statement;
pub mod traits;
mod transaction;
pub mod value;

pub use connection::{SqliteStore, IN_MEMORY};
pub use error::{StoreError, StoreResult};
pub use options::{JournalMode, StoreOptions};
pub use statement::SqliteStatement;
pub use traits::{PreparedStatement, Store};
pub use transaction::Transaction;
pub use value::{Row, Rows, TypeMismatch, Value, ValueKind};
