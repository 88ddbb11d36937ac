//! Resource address routing.
//!
//! # Responsibility
//! - Resolve an address string to the collection or to one row.
//! - Build canonical collection and item addresses.
//!
//! # Invariants
//! - The route table is fixed when the router is constructed.
//! - Every address resolves to exactly one of `Collection`, `Item` or
//!   `Unrecognized`.
//! - `item_address(id)` always routes back to `Item` with the same id.

use crate::config::ProviderConfig;
use crate::provider::{ProviderError, ProviderResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// Address scheme shared by every depiction address.
pub const SCHEME: &str = "content";
/// Path of the depictions collection.
pub const BASE_PATH: &str = "depictions";

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z][a-z0-9+.-]*)://([^/?#]*)([^?#]*)").expect("valid address regex")
});

/// Result of resolving an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    Collection,
    /// Single row; `id_segment` is the raw trailing path segment.
    Item { id_segment: String },
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Collection,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    /// `#`: one segment of ASCII digits.
    Number,
}

#[derive(Debug, Clone)]
struct Route {
    segments: Vec<PatternSegment>,
    kind: RouteKind,
}

/// Immutable address router for one authority.
#[derive(Debug, Clone)]
pub struct AddressRouter {
    authority: String,
    routes: Vec<Route>,
}

impl AddressRouter {
    /// Builds the route table for `config.authority()`.
    pub fn new(config: &ProviderConfig) -> Self {
        let mut router = Self {
            authority: config.authority().to_string(),
            routes: Vec::new(),
        };
        router.add_route(BASE_PATH, RouteKind::Collection);
        router.add_route(&format!("{BASE_PATH}/#"), RouteKind::Item);
        router
    }

    fn add_route(&mut self, pattern: &str, kind: RouteKind) {
        let segments = pattern
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment {
                "#" => PatternSegment::Number,
                literal => PatternSegment::Literal(literal.to_string()),
            })
            .collect();
        self.routes.push(Route { segments, kind });
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Resolves `address` against the route table.
    ///
    /// Query strings and fragments are ignored; empty path segments are skipped.
    pub fn route(&self, address: &str) -> RouteMatch {
        let Some(captures) = ADDRESS_RE.captures(address) else {
            return RouteMatch::Unrecognized;
        };
        if &captures[1] != SCHEME || &captures[2] != self.authority {
            return RouteMatch::Unrecognized;
        }

        let path: Vec<&str> = captures[3]
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        for route in &self.routes {
            if route.segments.len() != path.len() {
                continue;
            }
            let matched = route
                .segments
                .iter()
                .zip(&path)
                .all(|(pattern, segment)| match pattern {
                    PatternSegment::Literal(literal) => literal == segment,
                    PatternSegment::Number => segment.bytes().all(|byte| byte.is_ascii_digit()),
                });
            if !matched {
                continue;
            }

            return match route.kind {
                RouteKind::Collection => RouteMatch::Collection,
                RouteKind::Item => RouteMatch::Item {
                    id_segment: path[path.len() - 1].to_string(),
                },
            };
        }

        RouteMatch::Unrecognized
    }

    /// Returns `content://<authority>/depictions`.
    pub fn collection_address(&self) -> String {
        format!("{SCHEME}://{}/{BASE_PATH}", self.authority)
    }

    /// Returns `content://<authority>/depictions/<id>`.
    ///
    /// # Errors
    /// - `InvalidArgument` when `id` is negative.
    pub fn item_address(&self, id: i64) -> ProviderResult<String> {
        if id < 0 {
            return Err(ProviderError::InvalidArgument(format!(
                "row id {id} cannot be addressed; ids must be non-negative"
            )));
        }
        Ok(format!("{}/{id}", self.collection_address()))
    }
}

/// Parses the trailing id segment of an item address as a base-10 integer.
pub fn parse_row_id(id_segment: &str) -> ProviderResult<i64> {
    id_segment.parse::<i64>().map_err(|err| {
        ProviderError::InvalidArgument(format!(
            "row id segment `{id_segment}` is not a valid integer: {err}"
        ))
    })
}
