use depiction_core::db::schema::{ALL_FIELDS, SCHEMA_VERSION, TABLE_NAME};
use depiction_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_depictions_table() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
    assert_eq!(table_columns(&conn, TABLE_NAME), ALL_FIELDS);
}

#[test]
fn reopening_file_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("depictions.db");

    let conn = open_db(&path).unwrap();
    conn.execute("INSERT INTO depictions (name) VALUES ('kept');", [])
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM depictions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(schema_version(&conn), SCHEMA_VERSION);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    columns
}
