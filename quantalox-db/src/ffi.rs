//! Raw `SQLite` handles.
//!
//! The symbols come from `libsqlite3-sys`, which compiles the bundled
//! amalgamation. This is the **only** file that contains `unsafe` code or C
//! types: [`RawDb`] owns a `sqlite3*`, [`RawStmt`] owns a `sqlite3_stmt*`, and
//! both release their handle when dropped.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::ptr::{self, NonNull};

use libsqlite3_sys as sys;

use super::error::EngineError;

// ── SQLite constants ────────────────────────────────────────────────────

pub const SQLITE_ROW: c_int = sys::SQLITE_ROW;

// Column type constants
pub const SQLITE_INTEGER: c_int = sys::SQLITE_INTEGER;
pub const SQLITE_FLOAT: c_int = sys::SQLITE_FLOAT;
pub const SQLITE_TEXT: c_int = sys::SQLITE_TEXT;
pub const SQLITE_BLOB: c_int = sys::SQLITE_BLOB;
pub const SQLITE_NULL: c_int = sys::SQLITE_NULL;

// Open flags
pub const SQLITE_OPEN_READONLY: c_int = sys::SQLITE_OPEN_READONLY;
pub const SQLITE_OPEN_READWRITE: c_int = sys::SQLITE_OPEN_READWRITE;
pub const SQLITE_OPEN_CREATE: c_int = sys::SQLITE_OPEN_CREATE;
pub const SQLITE_OPEN_FULLMUTEX: c_int = sys::SQLITE_OPEN_FULLMUTEX;

/// Copies a C string owned by `SQLite` into a Rust `String`.
///
/// # Safety
///
/// `ptr` must be null or point at a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn owned_str(ptr: *const c_char, fallback: &str) -> String {
    if ptr.is_null() {
        fallback.to_string()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn to_c_string(s: &str, what: &str) -> Result<CString, EngineError> {
    CString::new(s).map_err(|e| EngineError::new(sys::SQLITE_MISUSE, format!("nul in {what}: {e}")))
}

fn to_len(len: usize) -> Result<c_int, EngineError> {
    c_int::try_from(len)
        .map_err(|_| EngineError::new(sys::SQLITE_TOOBIG, "string or blob too big"))
}

// ── Connection ──────────────────────────────────────────────────────────

/// Owned `sqlite3*` handle. Closed when dropped.
pub struct RawDb {
    db: NonNull<sys::sqlite3>,
}

// Safety: connections are opened with SQLITE_OPEN_FULLMUTEX and `RawDb` is not
// `Sync`, so at most one thread drives a handle at a time.
unsafe impl Send for RawDb {}

impl RawDb {
    /// Opens (or creates) the database at `path` with the given open flags.
    pub fn open(path: &str, flags: c_int) -> Result<Self, EngineError> {
        let c_path = to_c_string(path, "path")?;
        let mut db: *mut sys::sqlite3 = ptr::null_mut();
        let rc = unsafe { sys::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };
        if rc != sys::SQLITE_OK {
            // A handle is usually allocated even on failure; read its message
            // before releasing it.
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = unsafe { owned_str(sys::sqlite3_errmsg(db), "Unknown error") };
                unsafe {
                    sys::sqlite3_close(db);
                }
                m
            };
            return Err(EngineError::new(rc, msg));
        }
        NonNull::new(db)
            .map(|db| Self { db })
            .ok_or_else(|| EngineError::new(sys::SQLITE_NOMEM, "out of memory"))
    }

    /// Runs one or more `;`-separated statements, discarding any rows.
    pub fn exec(&self, sql: &str) -> Result<(), EngineError> {
        let c_sql = to_c_string(sql, "SQL")?;
        let mut errmsg: *mut c_char = ptr::null_mut();
        let rc = unsafe {
            sys::sqlite3_exec(
                self.db.as_ptr(),
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                &mut errmsg,
            )
        };
        if rc != sys::SQLITE_OK {
            let msg = if errmsg.is_null() {
                self.errmsg()
            } else {
                let s = unsafe { owned_str(errmsg, "Unknown error") };
                unsafe { sys::sqlite3_free(errmsg.cast()) };
                s
            };
            return Err(EngineError::new(rc, msg));
        }
        Ok(())
    }

    /// Compiles the first statement in `sql`.
    pub fn prepare(&self, sql: &str) -> Result<RawStmt<'_>, EngineError> {
        let c_sql = to_c_string(sql, "SQL")?;
        let mut stmt: *mut sys::sqlite3_stmt = ptr::null_mut();
        let rc = unsafe {
            sys::sqlite3_prepare_v2(
                self.db.as_ptr(),
                c_sql.as_ptr(),
                -1,
                &mut stmt,
                ptr::null_mut(),
            )
        };
        if rc != sys::SQLITE_OK {
            return Err(EngineError::new(rc, self.errmsg()));
        }
        // Blank input or a lone comment compiles to no statement at all.
        NonNull::new(stmt)
            .map(|stmt| RawStmt {
                stmt,
                db: self.db,
                _conn: PhantomData,
            })
            .ok_or_else(|| EngineError::new(sys::SQLITE_MISUSE, "empty statement"))
    }

    /// Row id of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { sys::sqlite3_last_insert_rowid(self.db.as_ptr()) }
    }

    /// Rows changed by the most recent INSERT/UPDATE/DELETE.
    pub fn changes(&self) -> c_int {
        unsafe { sys::sqlite3_changes(self.db.as_ptr()) }
    }

    fn errmsg(&self) -> String {
        errmsg_raw(self.db)
    }
}

impl Drop for RawDb {
    fn drop(&mut self) {
        // Every `RawStmt` borrows this handle, so all statements are
        // finalized by now.
        unsafe {
            sys::sqlite3_close(self.db.as_ptr());
        }
    }
}

fn errmsg_raw(db: NonNull<sys::sqlite3>) -> String {
    unsafe { owned_str(sys::sqlite3_errmsg(db.as_ptr()), "Unknown error") }
}

// ── Statement ───────────────────────────────────────────────────────────

/// Owned `sqlite3_stmt*` handle. Finalized when dropped.
///
/// Borrows the [`RawDb`] it was prepared on, so it cannot outlive it.
pub struct RawStmt<'conn> {
    stmt: NonNull<sys::sqlite3_stmt>,
    db: NonNull<sys::sqlite3>,
    _conn: PhantomData<&'conn RawDb>,
}

impl RawStmt<'_> {
    fn check(&self, rc: c_int) -> Result<(), EngineError> {
        if rc == sys::SQLITE_OK {
            Ok(())
        } else {
            Err(EngineError::new(rc, errmsg_raw(self.db)))
        }
    }

    /// See [`RawDb::last_insert_rowid`].
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { sys::sqlite3_last_insert_rowid(self.db.as_ptr()) }
    }

    /// See [`RawDb::changes`].
    pub fn changes(&self) -> c_int {
        unsafe { sys::sqlite3_changes(self.db.as_ptr()) }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    pub fn bind_null(&self, idx: c_int) -> Result<(), EngineError> {
        self.check(unsafe { sys::sqlite3_bind_null(self.stmt.as_ptr(), idx) })
    }

    pub fn bind_i64(&self, idx: c_int, value: i64) -> Result<(), EngineError> {
        self.check(unsafe { sys::sqlite3_bind_int64(self.stmt.as_ptr(), idx, value) })
    }

    pub fn bind_f64(&self, idx: c_int, value: f64) -> Result<(), EngineError> {
        self.check(unsafe { sys::sqlite3_bind_double(self.stmt.as_ptr(), idx, value) })
    }

    pub fn bind_text(&self, idx: c_int, value: &str) -> Result<(), EngineError> {
        let len = to_len(value.len())?;
        self.check(unsafe {
            sys::sqlite3_bind_text(
                self.stmt.as_ptr(),
                idx,
                value.as_ptr().cast(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        })
    }

    pub fn bind_blob(&self, idx: c_int, value: &[u8]) -> Result<(), EngineError> {
        let len = to_len(value.len())?;
        self.check(unsafe {
            sys::sqlite3_bind_blob(
                self.stmt.as_ptr(),
                idx,
                value.as_ptr().cast(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        })
    }

    pub fn parameter_count(&self) -> c_int {
        unsafe { sys::sqlite3_bind_parameter_count(self.stmt.as_ptr()) }
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Advances the cursor. Returns `SQLITE_ROW` or `SQLITE_DONE`.
    pub fn step(&self) -> Result<c_int, EngineError> {
        let rc = unsafe { sys::sqlite3_step(self.stmt.as_ptr()) };
        match rc {
            sys::SQLITE_ROW | sys::SQLITE_DONE => Ok(rc),
            _ => Err(EngineError::new(rc, errmsg_raw(self.db))),
        }
    }

    /// Rewinds the cursor and clears every binding.
    ///
    /// The code returned by `sqlite3_reset` repeats the last step's failure,
    /// which has already been reported, so it is not inspected.
    pub fn reset(&self) {
        unsafe {
            sys::sqlite3_reset(self.stmt.as_ptr());
            sys::sqlite3_clear_bindings(self.stmt.as_ptr());
        }
    }

    // ── Column reading ──────────────────────────────────────────────────

    pub fn column_count(&self) -> c_int {
        unsafe { sys::sqlite3_column_count(self.stmt.as_ptr()) }
    }

    pub fn column_type(&self, col: c_int) -> c_int {
        unsafe { sys::sqlite3_column_type(self.stmt.as_ptr(), col) }
    }

    pub fn column_name(&self, col: c_int) -> String {
        unsafe { owned_str(sys::sqlite3_column_name(self.stmt.as_ptr(), col), "") }
    }

    pub fn column_i64(&self, col: c_int) -> i64 {
        unsafe { sys::sqlite3_column_int64(self.stmt.as_ptr(), col) }
    }

    pub fn column_f64(&self, col: c_int) -> f64 {
        unsafe { sys::sqlite3_column_double(self.stmt.as_ptr(), col) }
    }

    /// Reads a column as UTF-8 text. A null pointer reads as empty text and
    /// invalid UTF-8 is replaced lossily.
    pub fn column_text(&self, col: c_int) -> String {
        unsafe {
            // column_text must precede column_bytes so the length matches the
            // text encoding.
            let ptr = sys::sqlite3_column_text(self.stmt.as_ptr(), col);
            let len = sys::sqlite3_column_bytes(self.stmt.as_ptr(), col);
            match usize::try_from(len) {
                Ok(len) if !ptr.is_null() => {
                    let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
                    String::from_utf8_lossy(bytes).into_owned()
                }
                _ => String::new(),
            }
        }
    }

    /// Reads a column as a blob. Null pointers and zero lengths read as empty.
    pub fn column_blob(&self, col: c_int) -> Vec<u8> {
        unsafe {
            let ptr = sys::sqlite3_column_blob(self.stmt.as_ptr(), col);
            let len = sys::sqlite3_column_bytes(self.stmt.as_ptr(), col);
            match usize::try_from(len) {
                Ok(len) if !ptr.is_null() && len > 0 => {
                    std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec()
                }
                _ => Vec::new(),
            }
        }
    }
}

impl Drop for RawStmt<'_> {
    fn drop(&mut self) {
        unsafe {
            sys::sqlite3_finalize(self.stmt.as_ptr());
        }
    }
}
