//! Materialized query results.

use crate::model::values::FieldValues;
use rusqlite::types::Value;

/// Rows returned by a store query, plus the address they were read through.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    notification_address: Option<String>,
}

impl RowSet {
    /// Builds a result set; every row must have one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Self {
            columns,
            rows,
            notification_address: None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|values| RowView {
            columns: &self.columns,
            values,
        })
    }

    /// Address observers should watch to learn that these rows may be stale.
    pub fn notification_address(&self) -> Option<&str> {
        self.notification_address.as_deref()
    }

    pub(crate) fn set_notification_address(&mut self, address: impl Into<String>) {
        self.notification_address = Some(address.into());
    }
}

/// Borrowed view of one row in a [`RowSet`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let values = self.values;
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| &values[index])
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_text(&self, column: &str) -> Option<&'a str> {
        match self.get(column)? {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Copies the row into field values, keyed by column name.
    pub fn to_field_values(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        for (column, value) in self.columns.iter().zip(self.values) {
            fields.put(column.as_str(), value.clone());
        }
        fields
    }
}
