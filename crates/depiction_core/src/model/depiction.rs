//! Depiction record model.
//!
//! # Invariants
//! - `id` is `None` until the row has been inserted.
//! - `to_values()` never writes `_id`; the store assigns it.

use crate::db::schema::{
    COLUMN_DESCRIPTION, COLUMN_ID, COLUMN_LAST_USED, COLUMN_NAME, COLUMN_TIMES_USED,
};
use crate::model::values::FieldValues;
use crate::store::RowView;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row identifier assigned by the store.
pub type DepictionId = i64;

/// One depiction as stored in the `depictions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depiction {
    pub id: Option<DepictionId>,
    /// Display label, unique across the table.
    pub name: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds.
    pub last_used: Option<i64>,
    pub times_used: i64,
}

/// Raised when a row does not have the shape of a depiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecodeError {
    pub column: &'static str,
    pub message: String,
}

impl Display for RowDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid depictions.{}: {}", self.column, self.message)
    }
}

impl Error for RowDecodeError {}

impl Depiction {
    /// Creates an unsaved depiction that has never been used.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            last_used: None,
            times_used: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Field values for insert/update, excluding `_id`.
    pub fn to_values(&self) -> FieldValues {
        FieldValues::new()
            .with(COLUMN_NAME, self.name.clone())
            .with(COLUMN_DESCRIPTION, self.description.clone())
            .with(COLUMN_LAST_USED, self.last_used)
            .with(COLUMN_TIMES_USED, self.times_used)
    }

    /// Decodes a row that was read with all depiction columns.
    pub fn from_row(row: &RowView<'_>) -> Result<Self, RowDecodeError> {
        Ok(Self {
            id: Some(required_integer(row, COLUMN_ID)?),
            name: required_text(row, COLUMN_NAME)?,
            description: optional_text(row, COLUMN_DESCRIPTION)?,
            last_used: optional_integer(row, COLUMN_LAST_USED)?,
            times_used: required_integer(row, COLUMN_TIMES_USED)?,
        })
    }
}

fn column<'r>(row: &'r RowView<'_>, column: &'static str) -> Result<&'r Value, RowDecodeError> {
    row.get(column).ok_or_else(|| RowDecodeError {
        column,
        message: "column missing from result".to_string(),
    })
}

fn optional_integer(row: &RowView<'_>, name: &'static str) -> Result<Option<i64>, RowDecodeError> {
    match column(row, name)? {
        Value::Null => Ok(None),
        Value::Integer(value) => Ok(Some(*value)),
        other => Err(unexpected_type(name, "integer", other)),
    }
}

fn required_integer(row: &RowView<'_>, name: &'static str) -> Result<i64, RowDecodeError> {
    optional_integer(row, name)?.ok_or_else(|| RowDecodeError {
        column: name,
        message: "unexpected NULL".to_string(),
    })
}

fn optional_text(row: &RowView<'_>, name: &'static str) -> Result<Option<String>, RowDecodeError> {
    match column(row, name)? {
        Value::Null => Ok(None),
        Value::Text(value) => Ok(Some(value.clone())),
        other => Err(unexpected_type(name, "text", other)),
    }
}

fn required_text(row: &RowView<'_>, name: &'static str) -> Result<String, RowDecodeError> {
    optional_text(row, name)?.ok_or_else(|| RowDecodeError {
        column: name,
        message: "unexpected NULL".to_string(),
    })
}

fn unexpected_type(column: &'static str, expected: &str, found: &Value) -> RowDecodeError {
    RowDecodeError {
        column,
        message: format!("expected {expected}, found {:?}", found.data_type()),
    }
}
