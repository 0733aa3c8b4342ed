// crates/keydeck-core/src/filters/store.rs
// ============================================================================
// Module: Query State Stores
// Description: Key-value backing stores for URL-style query state.
// Purpose: Make the browser URL one interchangeable backend among several.
// Dependencies: serde, thiserror, url
// ============================================================================

//! ## Overview
//! Filter state lives in a flat string map. [`QueryStateStore`] is the seam:
//! callers read a full snapshot and write a full replacement, so there is no
//! partial-write window. [`MemoryQueryStore`] backs headless use and tests;
//! [`UrlQueryStore`] keeps the map in the query string of a [`Url`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

// ============================================================================
// SECTION: Query Params
// ============================================================================

/// Flat query-parameter map.
///
/// # Invariants
/// - One value per key; when parsing, later duplicates replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a form-urlencoded query string (without the leading `?`).
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    /// Serializes the map as a form-urlencoded query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type IntoIter = btree_map::Iter<'a, String, String>;
    type Item = (&'a String, &'a String);

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// SECTION: Store Trait
// ============================================================================

/// Query state store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backing store failure.
    #[error("query state store error: {0}")]
    Store(String),
    /// Input could not be interpreted as query state.
    #[error("invalid query state: {0}")]
    Invalid(String),
}

/// Backing store for query state.
pub trait QueryStateStore {
    /// Returns the full current state.
    fn snapshot(&self) -> QueryParams;

    /// Replaces the full state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the state cannot be written.
    fn replace(&mut self, params: QueryParams) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory query state store for headless use and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryQueryStore {
    /// Current state.
    params: QueryParams,
    /// Number of replacements performed.
    writes: usize,
}

impl MemoryQueryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from a query string.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self {
            params: QueryParams::parse(query),
            writes: 0,
        }
    }

    /// Returns the number of replacements performed.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl QueryStateStore for MemoryQueryStore {
    fn snapshot(&self) -> QueryParams {
        self.params.clone()
    }

    fn replace(&mut self, params: QueryParams) -> Result<(), StoreError> {
        self.params = params;
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// SECTION: URL Store
// ============================================================================

/// Query state kept in the query string of a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlQueryStore {
    /// Current URL.
    url: Url,
}

impl UrlQueryStore {
    /// Wraps an existing URL.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self {
            url,
        }
    }

    /// Parses an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the URL cannot be parsed.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Url::parse(raw).map(Self::new).map_err(|err| StoreError::Invalid(err.to_string()))
    }

    /// Returns the current URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

impl QueryStateStore for UrlQueryStore {
    fn snapshot(&self) -> QueryParams {
        self.url.query_pairs().into_owned().collect()
    }

    fn replace(&mut self, params: QueryParams) -> Result<(), StoreError> {
        if params.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.set_query(Some(&params.to_query_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
