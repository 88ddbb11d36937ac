//! Column/value sets for insert and update.

use rusqlite::types::Value;
use std::collections::BTreeMap;

/// Column → value map passed to insert and update operations.
///
/// Iteration order is sorted by column name, so generated SQL is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    values: BTreeMap<String, Value>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, replacing any previous value.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Builder form of [`FieldValues::put`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn put_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.values.insert(column.into(), Value::Null);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(column, value)| (column.as_str(), value))
    }
}
