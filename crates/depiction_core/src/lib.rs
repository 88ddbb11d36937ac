//! Routed data access for the depictions table.
//!
//! Addresses of the form `content://<authority>/depictions[/<id>]` are
//! resolved by [`AddressRouter`] and dispatched by [`DepictionProvider`] to
//! SQLite through [`DepictionStore`]. Every successful write is reported to a
//! [`ChangeNotifier`].

pub mod address;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod provider;
pub mod service;
pub mod store;

pub use address::{AddressRouter, RouteMatch, BASE_PATH, SCHEME};
pub use config::{ConfigError, ProviderConfig, DEFAULT_AUTHORITY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::depiction::{Depiction, DepictionId, RowDecodeError};
pub use model::values::FieldValues;
pub use notify::{ChangeNotifier, ContentObserver, NoopNotifier, ObserverId, ObserverRegistry};
pub use provider::{DepictionProvider, Operation, ProviderError, ProviderResult, QueryRequest};
pub use service::depiction_dao::{DaoError, DaoResult, DepictionDao};
pub use store::{DepictionStore, RowSet, RowView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
