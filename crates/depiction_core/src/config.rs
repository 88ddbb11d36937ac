//! Provider configuration.
//!
//! # Invariants
//! - A `ProviderConfig` can only hold a validated authority.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authority used when the host does not configure one.
pub const DEFAULT_AUTHORITY: &str = "org.depictions.provider";

static AUTHORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("valid authority regex"));

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidAuthority(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAuthority(value) => write!(
                f,
                "authority `{value}` is invalid; expected lowercase [a-z0-9._-]"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Settings the provider is constructed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    authority: String,
}

impl ProviderConfig {
    /// Builds a config after trimming and validating `authority`.
    pub fn new(authority: impl Into<String>) -> Result<Self, ConfigError> {
        let authority = authority.into().trim().to_string();
        if !AUTHORITY_RE.is_match(&authority) {
            return Err(ConfigError::InvalidAuthority(authority));
        }
        Ok(Self { authority })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }
}
