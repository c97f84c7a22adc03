//! Bulk helper tests: all-or-nothing semantics over a file-backed store.

use quantalox_db::{params, PreparedStatement, Rows, SqliteStore, Store, Value};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> SqliteStore {
    let store = SqliteStore::connect(dir.path().join("bulk.db")).expect("open");
    store
        .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL)")
        .expect("create table");
    store
}

fn count(store: &SqliteStore) -> i64 {
    store.query("SELECT COUNT(*) FROM t").expect("count")[0][0]
        .as_integer()
        .expect("integer")
}

#[test]
fn test_bulk_insert_scenario() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    let inserted = store
        .bulk_insert("t", &["v"], &[params!["a"], params!["b"], params!["c"]])
        .expect("bulk insert");
    assert_eq!(inserted, 3);

    let rows = store.query("SELECT v FROM t ORDER BY id").expect("query");
    assert_eq!(
        rows,
        vec![
            vec![Value::from("a")],
            vec![Value::from("b")],
            vec![Value::from("c")]
        ]
    );
}

#[test]
fn test_bulk_insert_multiple_columns() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::connect(dir.path().join("cols.db")).expect("open");
    store
        .execute("CREATE TABLE m (name TEXT, reading REAL, raw BLOB, note TEXT)")
        .expect("create table");

    let rows = vec![
        params!["sensor-1", 20.5, vec![1u8, 2, 3], None::<String>],
        params!["sensor-2", -3.25, Vec::<u8>::new(), Some("calibrated")],
    ];
    let inserted = store
        .bulk_insert("m", &["name", "reading", "raw", "note"], &rows)
        .expect("bulk insert");
    assert_eq!(inserted, 2);

    let read_back = store
        .query("SELECT name, reading, raw, note FROM m ORDER BY rowid")
        .expect("query");
    assert_eq!(read_back, rows);
}

#[test]
fn test_bulk_insert_is_atomic() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    // The middle row violates NOT NULL.
    let rows = vec![params!["a"], params![None::<String>], params!["c"]];
    let err = store.bulk_insert("t", &["v"], &rows).unwrap_err();
    assert!(err.is_query());
    assert!(err.message().starts_with("executeBatch: "));
    assert_eq!(count(&store), 0, "no partial batch may survive");

    // The store is usable afterwards and no transaction is left open.
    store.begin_transaction().expect("begin");
    store.rollback().expect("rollback");
}

#[test]
fn test_bulk_execute_is_atomic() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    let sets = vec![
        params![1_i64, "a"],
        params![2_i64, "b"],
        params![1_i64, "duplicate key"],
        params![4_i64, "d"],
    ];
    let err = store
        .bulk_execute("INSERT INTO t (id, v) VALUES (?, ?)", &sets)
        .unwrap_err();
    assert!(err.is_query());
    assert_eq!(count(&store), 0);
}

#[test]
fn test_bulk_execute_wrong_arity_rolls_back() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    let sets = vec![params!["a"], params!["b", "extra"], params!["c"]];
    let err = store
        .bulk_execute("INSERT INTO t (v) VALUES (?)", &sets)
        .unwrap_err();
    assert!(err.is_query());
    assert_eq!(count(&store), 0);
}

#[test]
fn test_bulk_insert_short_row_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::connect(dir.path().join("short.db")).expect("open");
    store
        .execute("CREATE TABLE p (v TEXT, w TEXT)")
        .expect("create table");

    let rows = vec![params!["a", "b"], params!["only-one"]];
    let err = store.bulk_insert("p", &["v", "w"], &rows).unwrap_err();
    assert!(err.is_query());
    assert_eq!(
        err.message(),
        "executeBatch: expected 2 parameters, got 1"
    );
    let left = store.query("SELECT COUNT(*) FROM p").expect("count");
    assert_eq!(left, vec![vec![Value::Integer(0)]]);
}

#[test]
fn test_bulk_execute_rejects_row_producing_sql() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);
    store
        .bulk_insert("t", &["v"], &[params!["a"], params!["b"]])
        .expect("seed");

    let none: Vec<Value> = Vec::new();
    let err = store
        .bulk_execute("SELECT v FROM t", &[none.clone(), none])
        .unwrap_err();
    assert!(err.is_query());
    assert_eq!(err.message(), "executeBatch: statement returned rows");

    store.begin_transaction().expect("no transaction left open");
    store.rollback().expect("rollback");
}

#[test]
fn test_bulk_execute_sums_affected_rows() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);
    store
        .bulk_insert(
            "t",
            &["v"],
            &[params!["a"], params!["a"], params!["b"], params!["c"]],
        )
        .expect("seed");

    let affected = store
        .bulk_execute(
            "UPDATE t SET v = ? WHERE v = ?",
            &[params!["x", "a"], params!["y", "b"], params!["z", "missing"]],
        )
        .expect("bulk update");
    assert_eq!(affected, 3);
}

#[test]
fn test_bulk_select_concatenates_in_parameter_order() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);
    store
        .bulk_insert("t", &["v"], &[params!["a"], params!["b"], params!["c"]])
        .expect("seed");

    let rows = store
        .bulk_select(
            "SELECT id, v FROM t WHERE id >= ? ORDER BY id",
            &[params![3_i64], params![1_i64], params![99_i64]],
        )
        .expect("bulk select");
    assert_eq!(
        rows,
        vec![
            vec![Value::Integer(3), Value::from("c")],
            vec![Value::Integer(1), Value::from("a")],
            vec![Value::Integer(2), Value::from("b")],
            vec![Value::Integer(3), Value::from("c")],
        ]
    );
}

#[test]
fn test_bulk_select_failure_releases_transaction() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);
    store
        .bulk_insert("t", &["v"], &[params!["a"]])
        .expect("seed");

    let sets = vec![params![1_i64], params![1_i64, 2_i64], params![1_i64]];
    let err = store
        .bulk_select("SELECT v FROM t WHERE id = ?", &sets)
        .unwrap_err();
    assert!(err.is_query());
    assert_eq!(err.message(), "execute: expected 1 parameters, got 2");

    store.begin_transaction().expect("no transaction left open");
    store.rollback().expect("rollback");
}

#[test]
fn test_empty_input_opens_no_transaction() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    // Hold a transaction: any helper that tried to BEGIN would now fail.
    let tx = store.transaction().expect("begin");
    let none: &[Vec<Value>] = &[];
    assert_eq!(store.bulk_insert("t", &["v"], none).expect("insert"), 0);
    assert_eq!(
        store
            .bulk_execute("INSERT INTO t (v) VALUES (?)", none)
            .expect("execute"),
        0
    );
    assert_eq!(
        store
            .bulk_select("SELECT v FROM t WHERE id = ?", none)
            .expect("select"),
        Rows::new()
    );
    // Not even the SQL is checked when there is nothing to run.
    assert_eq!(store.bulk_insert("no_such_table", &["v"], none).expect("insert"), 0);
    tx.rollback().expect("rollback");
}

#[test]
fn test_bulk_helpers_refuse_to_nest() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);
    let tx = store.transaction().expect("begin");
    let err = store.bulk_insert("t", &["v"], &[params!["a"]]).unwrap_err();
    assert!(err.is_query());
    tx.rollback().expect("rollback");
    assert_eq!(count(&store), 0);
}

#[test]
fn test_execute_batch_inside_guard() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir);

    let mut stmt = store.prepare("INSERT INTO t (v) VALUES (?)").expect("prepare");
    let tx = store.transaction().expect("begin");
    let total = stmt
        .execute_batch(&[params!["a"], params!["b"]])
        .expect("batch");
    assert_eq!(total, 2);
    tx.commit().expect("commit");

    // The statement stays usable after the batch.
    stmt.reset();
    stmt.bind(1, "c").expect("bind");
    assert_eq!(stmt.execute_insert().expect("insert"), 3);
    assert_eq!(count(&store), 3);
}

#[test]
fn test_bulk_closed_store_is_connection_error() {
    let store = SqliteStore::new();
    let err = store.bulk_insert("t", &["v"], &[params!["a"]]).unwrap_err();
    assert!(err.is_connection());
}
