//! Depictions content provider: routed CRUD over the `depictions` table.
//!
//! # Responsibility
//! - Resolve each address through the [`AddressRouter`] before touching the store.
//! - Dispatch read/insert/bulk-insert/update/delete to store primitives.
//! - Signal the [`ChangeNotifier`] after every successful mutation.
//!
//! # Invariants
//! - Unrecognized addresses fail before any store handle is acquired.
//! - Item reads and updates build the `_id` predicate themselves; caller
//!   selection text is never combined with an id from the address.
//! - Bulk insert commits all rows or none.
//! - Notifications are sent after the store handle is released.
//! - Delete never mutates and always reports zero rows.

use crate::address::{parse_row_id, AddressRouter, RouteMatch};
use crate::db::schema::{ALL_FIELDS, COLUMN_ID, TABLE_NAME};
use crate::db::DbError;
use crate::model::values::FieldValues;
use crate::notify::{ChangeNotifier, NoopNotifier};
use crate::store::{DepictionStore, RowSet};
use log::{debug, error, info};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Operations exposed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Query,
    Insert,
    BulkInsert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Insert => "insert",
            Self::BulkInsert => "bulk_insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Typed failure for every provider call.
#[derive(Debug)]
pub enum ProviderError {
    /// Address matches neither the collection nor the item shape.
    UnrecognizedAddress(String),
    /// Operation is not defined for the resolved target.
    UnsupportedOperation {
        operation: Operation,
        address: String,
    },
    /// Caller violated a precondition.
    InvalidArgument(String),
    /// The store rejected or failed the statement.
    Store(DbError),
}

impl ProviderError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedAddress(_) => "unrecognized_address",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedAddress(address) => write!(f, "unknown address: {address}"),
            Self::UnsupportedOperation { operation, address } => write!(
                f,
                "operation `{}` is not supported for address {address}",
                operation.as_str()
            ),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ProviderError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for ProviderError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

/// Read options for [`DepictionProvider::query`].
///
/// Only collection reads honor `projection` and `selection`; item reads
/// always return every column of the addressed row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    /// Columns to return; `None` returns all columns.
    pub projection: Option<Vec<String>>,
    /// SQL predicate without the `WHERE` keyword.
    pub selection: Option<String>,
    /// Values bound, as text, to `?` placeholders in `selection`.
    pub selection_args: Vec<String>,
    /// SQL ordering clause without `ORDER BY`.
    pub sort_order: Option<String>,
}

enum Target {
    Collection,
    Item(String),
}

/// Routed data-access layer over the depictions table.
pub struct DepictionProvider<N: ChangeNotifier = NoopNotifier> {
    router: AddressRouter,
    store: DepictionStore,
    notifier: N,
}

impl<N: ChangeNotifier> DepictionProvider<N> {
    pub fn new(router: AddressRouter, store: DepictionStore, notifier: N) -> Self {
        Self {
            router,
            store,
            notifier,
        }
    }

    pub fn router(&self) -> &AddressRouter {
        &self.router
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Reads rows from the collection or one row by id.
    ///
    /// The returned set carries `address` as its notification address.
    ///
    /// # Errors
    /// - `UnrecognizedAddress` for unknown addresses.
    /// - `InvalidArgument` when the item id does not fit an `i64`.
    /// - `Store` when the statement fails (bad projection, selection, args).
    pub fn query(&self, address: &str, request: &QueryRequest) -> ProviderResult<RowSet> {
        let started_at = Instant::now();
        let result = self.query_inner(address, request);
        finish(Operation::Query, started_at, result, |rows| {
            format!("rows={}", rows.len())
        })
    }

    fn query_inner(&self, address: &str, request: &QueryRequest) -> ProviderResult<RowSet> {
        let mut rows = match self.resolve(address)? {
            Target::Collection => {
                let projection: Vec<&str> = request
                    .projection
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .collect();
                let args: Vec<Value> = request
                    .selection_args
                    .iter()
                    .map(|arg| Value::Text(arg.clone()))
                    .collect();
                self.store.readable()?.query(
                    TABLE_NAME,
                    &projection,
                    request.selection.as_deref(),
                    &args,
                    request.sort_order.as_deref(),
                )?
            }
            Target::Item(id_segment) => {
                let id = parse_row_id(&id_segment)?;
                self.store.readable()?.query(
                    TABLE_NAME,
                    ALL_FIELDS,
                    Some(id_predicate().as_str()),
                    &[Value::Integer(id)],
                    request.sort_order.as_deref(),
                )?
            }
        };
        rows.set_notification_address(address);
        Ok(rows)
    }

    /// Inserts one row into the collection and returns its id.
    ///
    /// # Errors
    /// - `UnsupportedOperation` for item addresses.
    /// - `Store` on constraint violations.
    pub fn insert(&self, address: &str, values: &FieldValues) -> ProviderResult<i64> {
        let started_at = Instant::now();
        let result = self.insert_inner(address, values);
        finish(Operation::Insert, started_at, result, |id| format!("id={id}"))
    }

    fn insert_inner(&self, address: &str, values: &FieldValues) -> ProviderResult<i64> {
        self.require_collection(Operation::Insert, address)?;
        let id = self.store.writable()?.insert(TABLE_NAME, values)?;
        self.notifier.notify_change(address);
        Ok(id)
    }

    /// Inserts all rows in one transaction and returns how many were inserted.
    ///
    /// Rows are inserted in slice order. When any insert fails the
    /// transaction is rolled back and no row is visible afterwards.
    pub fn bulk_insert(&self, address: &str, rows: &[FieldValues]) -> ProviderResult<usize> {
        let started_at = Instant::now();
        let result = self.bulk_insert_inner(address, rows);
        finish(Operation::BulkInsert, started_at, result, |count| {
            format!("rows={count}")
        })
    }

    fn bulk_insert_inner(&self, address: &str, rows: &[FieldValues]) -> ProviderResult<usize> {
        self.require_collection(Operation::BulkInsert, address)?;
        {
            let mut handle = self.store.writable()?;
            let tx = handle.transaction()?;
            for (index, row) in rows.iter().enumerate() {
                debug!(
                    "event=provider_bulk_insert module=provider status=progress index={} columns={}",
                    index,
                    row.len()
                );
                tx.insert(TABLE_NAME, row)?;
            }
            tx.commit()?;
        }
        self.notifier.notify_change(address);
        Ok(rows.len())
    }

    /// Updates the row named by an item address.
    ///
    /// # Errors
    /// - `UnsupportedOperation` for the collection address.
    /// - `InvalidArgument` when `selection` is non-empty, `values` is empty,
    ///   or the id does not fit an `i64`.
    pub fn update(
        &self,
        address: &str,
        values: &FieldValues,
        selection: Option<&str>,
        selection_args: &[String],
    ) -> ProviderResult<usize> {
        let started_at = Instant::now();
        let result = self.update_inner(address, values, selection, selection_args);
        finish(Operation::Update, started_at, result, |count| {
            format!("rows={count}")
        })
    }

    fn update_inner(
        &self,
        address: &str,
        values: &FieldValues,
        selection: Option<&str>,
        _selection_args: &[String],
    ) -> ProviderResult<usize> {
        let id_segment = match self.resolve(address)? {
            Target::Item(id_segment) => id_segment,
            Target::Collection => return Err(unsupported(Operation::Update, address)),
        };
        if selection.is_some_and(|text| !text.is_empty()) {
            return Err(ProviderError::InvalidArgument(
                "selection must be empty when updating by id".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "update values cannot be empty".to_string(),
            ));
        }
        let id = parse_row_id(&id_segment)?;

        let changed = self.store.writable()?.update(
            TABLE_NAME,
            values,
            &id_predicate(),
            &[Value::Integer(id)],
        )?;
        self.notifier.notify_change(address);
        Ok(changed)
    }

    /// Always returns 0 without touching the store.
    ///
    /// Row removal is disabled for this table; callers get a successful
    /// zero-row result for any address and arguments.
    pub fn delete(
        &self,
        address: &str,
        _selection: Option<&str>,
        _selection_args: &[String],
    ) -> usize {
        debug!(
            "event=provider_delete module=provider status=ok rows=0 address={}",
            address
        );
        0
    }

    fn resolve(&self, address: &str) -> ProviderResult<Target> {
        match self.router.route(address) {
            RouteMatch::Collection => Ok(Target::Collection),
            RouteMatch::Item { id_segment } => Ok(Target::Item(id_segment)),
            RouteMatch::Unrecognized => {
                Err(ProviderError::UnrecognizedAddress(address.to_string()))
            }
        }
    }

    fn require_collection(&self, operation: Operation, address: &str) -> ProviderResult<()> {
        match self.resolve(address)? {
            Target::Collection => Ok(()),
            Target::Item(_) => Err(unsupported(operation, address)),
        }
    }
}

fn unsupported(operation: Operation, address: &str) -> ProviderError {
    ProviderError::UnsupportedOperation {
        operation,
        address: address.to_string(),
    }
}

fn id_predicate() -> String {
    format!("{COLUMN_ID} = ?")
}

fn finish<T>(
    operation: Operation,
    started_at: Instant,
    result: ProviderResult<T>,
    summary: impl FnOnce(&T) -> String,
) -> ProviderResult<T> {
    match &result {
        Ok(value) => info!(
            "event=provider_{} module=provider status=ok duration_ms={} {}",
            operation.as_str(),
            started_at.elapsed().as_millis(),
            summary(value)
        ),
        Err(err) => error!(
            "event=provider_{} module=provider status=error duration_ms={} error_code={} error={}",
            operation.as_str(),
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }
    result
}
