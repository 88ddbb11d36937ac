//! Client-facing services built on the provider.
//!
//! # Responsibility
//! - Keep record mapping out of callers that only need typed depictions.

pub mod depiction_dao;
