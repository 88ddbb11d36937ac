//! Record shapes exchanged with the provider.
//!
//! # Responsibility
//! - `FieldValues`: column/value pairs written by insert and update.
//! - `Depiction`: typed view of one depictions row for client code.

pub mod depiction;
pub mod values;
