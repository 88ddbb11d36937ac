//! Depictions table definition and schema bootstrap.
//!
//! # Invariants
//! - `COLUMN_ID` is the integer primary key; ids are never reused.
//! - `ALL_FIELDS` lists every column in table order.
//! - Bootstrap only creates missing objects; it never alters existing ones.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

pub const TABLE_NAME: &str = "depictions";

pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_DESCRIPTION: &str = "description";
/// Unix epoch milliseconds of the last time the depiction was picked.
pub const COLUMN_LAST_USED: &str = "last_used";
pub const COLUMN_TIMES_USED: &str = "times_used";

pub const ALL_FIELDS: &[&str] = &[
    COLUMN_ID,
    COLUMN_NAME,
    COLUMN_DESCRIPTION,
    COLUMN_LAST_USED,
    COLUMN_TIMES_USED,
];

/// Schema version written to `PRAGMA user_version` after bootstrap.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS depictions (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    last_used INTEGER,
    times_used INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_depictions_last_used ON depictions (last_used);";

/// Creates the depictions table when absent and stamps the schema version.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(CREATE_TABLE_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
