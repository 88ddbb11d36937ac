//! Client-side access to depictions through the provider.
//!
//! # Responsibility
//! - Map `Depiction` records to provider addresses and field values.
//! - Offer the lookups pickers need: by id, by name, most recently used.
//!
//! # Invariants
//! - All reads and writes go through `DepictionProvider`, so every write
//!   produces the same change notifications as a direct provider call.

use crate::db::schema::{COLUMN_ID, COLUMN_LAST_USED, COLUMN_NAME};
use crate::model::depiction::{Depiction, DepictionId, RowDecodeError};
use crate::notify::ChangeNotifier;
use crate::provider::{DepictionProvider, ProviderError, QueryRequest};
use crate::store::RowSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DaoResult<T> = Result<T, DaoError>;

#[derive(Debug)]
pub enum DaoError {
    Provider(ProviderError),
    InvalidData(RowDecodeError),
}

impl Display for DaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "{err}"),
            Self::InvalidData(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::InvalidData(err) => Some(err),
        }
    }
}

impl From<ProviderError> for DaoError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<RowDecodeError> for DaoError {
    fn from(value: RowDecodeError) -> Self {
        Self::InvalidData(value)
    }
}

/// Depiction lookups and saves on top of a provider.
pub struct DepictionDao<'p, N: ChangeNotifier> {
    provider: &'p DepictionProvider<N>,
}

impl<'p, N: ChangeNotifier> DepictionDao<'p, N> {
    pub fn new(provider: &'p DepictionProvider<N>) -> Self {
        Self { provider }
    }

    /// Inserts a new depiction or updates an existing one.
    ///
    /// On insert, `depiction.id` is set to the generated id.
    pub fn save(&self, depiction: &mut Depiction) -> DaoResult<()> {
        let router = self.provider.router();
        match depiction.id {
            None => {
                let id = self
                    .provider
                    .insert(&router.collection_address(), &depiction.to_values())?;
                depiction.id = Some(id);
            }
            Some(id) => {
                self.provider.update(
                    &router.item_address(id)?,
                    &depiction.to_values(),
                    None,
                    &[],
                )?;
            }
        }
        Ok(())
    }

    pub fn find(&self, id: DepictionId) -> DaoResult<Option<Depiction>> {
        let address = self.provider.router().item_address(id)?;
        let rows = self.provider.query(&address, &QueryRequest::default())?;
        first(&rows)
    }

    pub fn find_by_name(&self, name: &str) -> DaoResult<Option<Depiction>> {
        let request = QueryRequest {
            selection: Some(format!("{COLUMN_NAME} = ?")),
            selection_args: vec![name.to_string()],
            ..QueryRequest::default()
        };
        let rows = self
            .provider
            .query(&self.provider.router().collection_address(), &request)?;
        first(&rows)
    }

    /// Returns up to `limit` depictions, most recently used first.
    ///
    /// Never-used depictions sort last.
    pub fn recent(&self, limit: u32) -> DaoResult<Vec<Depiction>> {
        let request = QueryRequest {
            sort_order: Some(format!(
                "{COLUMN_LAST_USED} IS NULL, {COLUMN_LAST_USED} DESC, {COLUMN_ID} DESC LIMIT {limit}"
            )),
            ..QueryRequest::default()
        };
        let rows = self
            .provider
            .query(&self.provider.router().collection_address(), &request)?;
        rows.rows()
            .map(|row| Depiction::from_row(&row).map_err(DaoError::from))
            .collect()
    }

    /// Records one use of `depiction` at `now_ms` and saves it.
    pub fn mark_used(&self, depiction: &mut Depiction, now_ms: i64) -> DaoResult<()> {
        depiction.times_used += 1;
        depiction.last_used = Some(now_ms);
        self.save(depiction)
    }
}

fn first(rows: &RowSet) -> DaoResult<Option<Depiction>> {
    match rows.row(0) {
        Some(row) => Ok(Some(Depiction::from_row(&row)?)),
        None => Ok(None),
    }
}
