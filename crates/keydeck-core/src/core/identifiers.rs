// crates/keydeck-core/src/core/identifiers.rs
// ============================================================================
// Module: Keydeck Identifiers
// Description: Opaque identifiers for APIs, keys, keyspaces, and root keys.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Identifiers are opaque and serialize as plain strings. Permission names are
//! the exception: they carry a syntax (dotted capability path) and expose a
//! validating constructor used before anything is sent to the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Opaque Identifiers
// ============================================================================

/// Declares a transparent string identifier with the shared accessor set.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// API identifier; scopes per-API permission catalogs and key queries.
    ApiId
);

string_id!(
    /// Key identifier for a single issued API key.
    KeyId
);

string_id!(
    /// Keyspace identifier (the key-auth space an API's keys live in).
    KeyspaceId
);

string_id!(
    /// Root key identifier for administrative keys.
    RootKeyId
);

// ============================================================================
// SECTION: Permission Names
// ============================================================================

/// Maximum accepted length of a permission string in bytes.
pub const MAX_PERMISSION_NAME_LENGTH: usize = 512;

/// Dotted-path capability string such as `api.api_123.read_key`.
///
/// # Invariants
/// - `new` performs no validation; `parse` enforces the boundary syntax.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(String);

/// Reasons a permission string fails boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionNameError {
    /// The permission string was empty.
    #[error("permission name must not be empty")]
    Empty,
    /// The permission string exceeded the maximum length.
    #[error("permission name exceeds {max} bytes (got {actual})")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Observed length.
        actual: usize,
    },
    /// The permission string contained a disallowed character.
    #[error("permission name contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The permission string contained an empty dotted segment.
    #[error("permission name contains an empty segment")]
    EmptySegment,
}

impl PermissionName {
    /// Creates a permission name without validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Parses and validates a permission name.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionNameError`] when the string is empty, too long,
    /// contains characters outside `[A-Za-z0-9_.*:-]`, or has empty segments.
    pub fn parse(name: &str) -> Result<Self, PermissionNameError> {
        Self::check(name)?;
        Ok(Self(name.to_string()))
    }

    /// Validates an already-constructed permission name.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionNameError`] under the same rules as [`Self::parse`].
    pub fn validate(&self) -> Result<(), PermissionNameError> {
        Self::check(&self.0)
    }

    /// Returns the permission as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the dotted segments of the permission.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Shared syntax check for `parse` and `validate`.
    fn check(name: &str) -> Result<(), PermissionNameError> {
        if name.is_empty() {
            return Err(PermissionNameError::Empty);
        }
        if name.len() > MAX_PERMISSION_NAME_LENGTH {
            return Err(PermissionNameError::TooLong {
                max: MAX_PERMISSION_NAME_LENGTH,
                actual: name.len(),
            });
        }
        if let Some(invalid) = name.chars().find(|ch| !is_permission_char(*ch)) {
            return Err(PermissionNameError::InvalidCharacter(invalid));
        }
        if name.split('.').any(str::is_empty) {
            return Err(PermissionNameError::EmptySegment);
        }
        Ok(())
    }
}

/// Returns true for characters allowed inside permission names.
const fn is_permission_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '*' | ':' | '-')
}

impl fmt::Display for PermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PermissionName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
