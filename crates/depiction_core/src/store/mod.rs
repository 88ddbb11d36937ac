//! Store boundary over one SQLite connection.
//!
//! # Responsibility
//! - Hand out read-only and read-write handles to the depictions database.
//! - Build and execute query/insert/update statements.
//! - Provide a scoped transaction that rolls back unless committed.
//!
//! # Invariants
//! - A handle holds the connection lock for its whole lifetime, so a
//!   transaction being built never interleaves with another operation.
//! - Selection and order-by text is passed through verbatim; values are
//!   always bound as parameters.
//! - Dropping a `TransactionScope` without `commit()` rolls back.

mod row_set;

pub use row_set::{RowSet, RowView};

use crate::db::{DbError, DbResult};
use crate::model::values::FieldValues;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use std::sync::{Mutex, MutexGuard};

/// Owner of the provider connection.
pub struct DepictionStore {
    conn: Mutex<Connection>,
}

impl DepictionStore {
    /// Wraps a connection that already has the depictions schema.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Acquires a handle that can only read.
    pub fn readable(&self) -> DbResult<ReadableHandle<'_>> {
        Ok(ReadableHandle { conn: self.lock()? })
    }

    /// Acquires a handle that can read and write.
    pub fn writable(&self) -> DbResult<WritableHandle<'_>> {
        Ok(WritableHandle { conn: self.lock()? })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }
}

/// Read-only access to the store.
pub struct ReadableHandle<'s> {
    conn: MutexGuard<'s, Connection>,
}

impl ReadableHandle<'_> {
    /// Runs `SELECT columns FROM table [WHERE selection] [ORDER BY order_by]`.
    ///
    /// An empty `columns` slice selects every column.
    pub fn query(
        &self,
        table: &str,
        columns: &[&str],
        selection: Option<&str>,
        args: &[Value],
        order_by: Option<&str>,
    ) -> DbResult<RowSet> {
        run_query(&self.conn, table, columns, selection, args, order_by)
    }
}

/// Read-write access to the store.
pub struct WritableHandle<'s> {
    conn: MutexGuard<'s, Connection>,
}

impl WritableHandle<'_> {
    pub fn query(
        &self,
        table: &str,
        columns: &[&str],
        selection: Option<&str>,
        args: &[Value],
        order_by: Option<&str>,
    ) -> DbResult<RowSet> {
        run_query(&self.conn, table, columns, selection, args, order_by)
    }

    /// Inserts one row and returns its row id.
    pub fn insert(&self, table: &str, values: &FieldValues) -> DbResult<i64> {
        run_insert(&self.conn, table, values)
    }

    /// Updates rows matching `predicate` and returns the affected count.
    pub fn update(
        &self,
        table: &str,
        values: &FieldValues,
        predicate: &str,
        args: &[Value],
    ) -> DbResult<usize> {
        run_update(&self.conn, table, values, predicate, args)
    }

    /// Begins an immediate transaction on this handle.
    pub fn transaction(&mut self) -> DbResult<TransactionScope<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(TransactionScope { tx })
    }
}

/// Open transaction; rolls back on drop unless [`TransactionScope::commit`] ran.
pub struct TransactionScope<'h> {
    tx: Transaction<'h>,
}

impl TransactionScope<'_> {
    pub fn insert(&self, table: &str, values: &FieldValues) -> DbResult<i64> {
        run_insert(&self.tx, table, values)
    }

    pub fn update(
        &self,
        table: &str,
        values: &FieldValues,
        predicate: &str,
        args: &[Value],
    ) -> DbResult<usize> {
        run_update(&self.tx, table, values, predicate, args)
    }

    pub fn commit(self) -> DbResult<()> {
        self.tx.commit()?;
        Ok(())
    }
}

fn run_query(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    selection: Option<&str>,
    args: &[Value],
    order_by: Option<&str>,
) -> DbResult<RowSet> {
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns.join(", ")
    };
    let mut sql = format!("SELECT {projection} FROM {table}");
    if let Some(selection) = non_blank(selection) {
        sql.push_str(" WHERE ");
        sql.push_str(selection);
    }
    if let Some(order_by) = non_blank(order_by) {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    let mut stmt = conn.prepare(&sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = column_names.len();

    let mut rows = stmt.query(params_from_iter(args))?;
    let mut values = Vec::new();
    while let Some(row) = rows.next()? {
        let mut current = Vec::with_capacity(width);
        for index in 0..width {
            current.push(row.get::<_, Value>(index)?);
        }
        values.push(current);
    }

    Ok(RowSet::new(column_names, values))
}

fn run_insert(conn: &Connection, table: &str, values: &FieldValues) -> DbResult<i64> {
    if values.is_empty() {
        conn.execute(&format!("INSERT INTO {table} DEFAULT VALUES;"), [])?;
        return Ok(conn.last_insert_rowid());
    }

    let columns = values
        .columns()
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; values.len()].join(", ");
    conn.execute(
        &format!("INSERT INTO {table} ({columns}) VALUES ({placeholders});"),
        params_from_iter(values.values()),
    )?;

    Ok(conn.last_insert_rowid())
}

fn run_update(
    conn: &Connection,
    table: &str,
    values: &FieldValues,
    predicate: &str,
    args: &[Value],
) -> DbResult<usize> {
    let assignments = values
        .columns()
        .map(|column| format!("{} = ?", quote_identifier(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!("UPDATE {table} SET {assignments}");
    if let Some(predicate) = non_blank(Some(predicate)) {
        sql.push_str(" WHERE ");
        sql.push_str(predicate);
    }

    let changed = conn.execute(&sql, params_from_iter(values.values().chain(args)))?;
    Ok(changed)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, DepictionStore};
    use crate::db::open_db_in_memory;
    use crate::model::values::FieldValues;
    use rusqlite::types::Value;

    fn store() -> DepictionStore {
        DepictionStore::new(open_db_in_memory().unwrap())
    }

    fn named(name: &str) -> FieldValues {
        FieldValues::new().with("name", name.to_string())
    }

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("name"), "\"name\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn insert_then_query_with_projection_and_order() {
        let store = store();
        {
            let handle = store.writable().unwrap();
            assert_eq!(handle.insert("depictions", &named("b")).unwrap(), 1);
            assert_eq!(handle.insert("depictions", &named("a")).unwrap(), 2);
        }

        let handle = store.readable().unwrap();
        let rows = handle
            .query("depictions", &["_id", "name"], None, &[], Some("name ASC"))
            .unwrap();
        assert_eq!(rows.columns(), ["_id", "name"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.row(0).unwrap().get_text("name"), Some("a"));
        assert!(rows.notification_address().is_none());
    }

    #[test]
    fn update_binds_values_before_predicate_args() {
        let store = store();
        let handle = store.writable().unwrap();
        let id = handle.insert("depictions", &named("old")).unwrap();

        let changed = handle
            .update(
                "depictions",
                &named("new"),
                "_id = ?",
                &[Value::Integer(id)],
            )
            .unwrap();
        assert_eq!(changed, 1);

        let rows = handle
            .query("depictions", &[], Some("_id = ?"), &[Value::Integer(id)], None)
            .unwrap();
        assert_eq!(rows.row(0).unwrap().get_text("name"), Some("new"));
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let store = store();
        let mut handle = store.writable().unwrap();
        {
            let tx = handle.transaction().unwrap();
            tx.insert("depictions", &named("uncommitted")).unwrap();
        }
        {
            let tx = handle.transaction().unwrap();
            tx.insert("depictions", &named("committed")).unwrap();
            tx.commit().unwrap();
        }

        let rows = handle.query("depictions", &["name"], None, &[], None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.row(0).unwrap().get_text("name"), Some("committed"));
    }

    #[test]
    fn constraint_violation_surfaces_as_error() {
        let store = store();
        let handle = store.writable().unwrap();
        handle.insert("depictions", &named("dup")).unwrap();
        assert!(handle.insert("depictions", &named("dup")).is_err());
        assert!(handle.insert("depictions", &FieldValues::new()).is_err());
    }
}
