// crates/keydeck-core/src/permissions/submission.rs
// ============================================================================
// Module: Root Key Permission Submission
// Description: Multi-catalog drafts, merged permission sets, and mutation requests.
// Purpose: Turn per-catalog selections into validated root-key mutations.
// Dependencies: crate::core, crate::permissions, serde, thiserror
// ============================================================================

//! ## Overview
//! A root-key editor holds one selection for the workspace catalog and one
//! per API. Selections stay independent while editing and are only merged
//! (sorted, de-duplicated) when a create or update request is built.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ApiId;
use crate::core::PermissionName;
use crate::core::PermissionNameError;
use crate::core::RootKeyId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum root key name length in characters.
pub const MAX_ROOT_KEY_NAME_LENGTH: usize = 50;

// ============================================================================
// SECTION: Draft
// ============================================================================

/// Per-catalog selections for one root key being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootKeyPermissionDraft {
    /// Workspace catalog selection.
    pub workspace: BTreeSet<PermissionName>,
    /// Per-API catalog selections.
    pub apis: BTreeMap<ApiId, BTreeSet<PermissionName>>,
}

impl RootKeyPermissionDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a draft from an existing permission set.
    ///
    /// Permissions of the form `api.<id>.<action>` with a concrete id land in
    /// that API's selection; everything else lands in the workspace selection.
    #[must_use]
    pub fn from_existing<'a>(permissions: impl IntoIterator<Item = &'a PermissionName>) -> Self {
        let mut draft = Self::new();
        for permission in permissions {
            let mut segments = permission.segments();
            match (segments.next(), segments.next()) {
                (Some("api"), Some(id)) if id != "*" => {
                    draft.apis.entry(ApiId::new(id)).or_default().insert(permission.clone());
                }
                _ => {
                    draft.workspace.insert(permission.clone());
                }
            }
        }
        draft
    }

    /// Returns the selection for an API, creating it on first use.
    pub fn api_mut(&mut self, api_id: &ApiId) -> &mut BTreeSet<PermissionName> {
        self.apis.entry(api_id.clone()).or_default()
    }

    /// Returns the merged, sorted, de-duplicated permission list.
    #[must_use]
    pub fn merged_permissions(&self) -> Vec<PermissionName> {
        merged_permissions(std::iter::once(&self.workspace).chain(self.apis.values()))
    }
}

/// Merges independent selections into one sorted, de-duplicated list.
#[must_use]
pub fn merged_permissions<'a>(
    selections: impl IntoIterator<Item = &'a BTreeSet<PermissionName>>,
) -> Vec<PermissionName> {
    let merged: BTreeSet<&PermissionName> = selections.into_iter().flatten().collect();
    merged.into_iter().cloned().collect()
}

// ============================================================================
// SECTION: Diff
// ============================================================================

/// Permission changes between a current and a desired set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDiff {
    /// Permissions to grant.
    pub added: Vec<PermissionName>,
    /// Permissions to revoke.
    pub removed: Vec<PermissionName>,
}

impl PermissionDiff {
    /// Computes the diff from `current` to `desired`.
    #[must_use]
    pub fn between(current: &BTreeSet<PermissionName>, desired: &BTreeSet<PermissionName>) -> Self {
        Self {
            added: desired.difference(current).cloned().collect(),
            removed: current.difference(desired).cloned().collect(),
        }
    }

    /// Returns true when nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Root key mutation validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// No permission was selected for a new key.
    #[error("select at least one permission")]
    NoPermissions,
    /// The key name was too long.
    #[error("root key name exceeds {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// A permission string was malformed.
    #[error("invalid permission {permission}: {source}")]
    InvalidPermission {
        /// Offending permission.
        permission: String,
        /// Underlying syntax error.
        source: PermissionNameError,
    },
}

/// Input for `rootKey.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRootKeyRequest {
    /// Optional display name.
    pub name: Option<String>,
    /// Permissions granted to the new key.
    pub permissions: Vec<PermissionName>,
}

impl CreateRootKeyRequest {
    /// Builds a request from a draft; blank names become `None`.
    #[must_use]
    pub fn from_draft(name: Option<&str>, draft: &RootKeyPermissionDraft) -> Self {
        Self {
            name: name.map(str::trim).filter(|name| !name.is_empty()).map(str::to_string),
            permissions: draft.merged_permissions(),
        }
    }

    /// Validates the request before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] when the name or permissions are invalid.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if let Some(name) = &self.name
            && name.chars().count() > MAX_ROOT_KEY_NAME_LENGTH
        {
            return Err(SubmissionError::NameTooLong {
                max: MAX_ROOT_KEY_NAME_LENGTH,
            });
        }
        if self.permissions.is_empty() {
            return Err(SubmissionError::NoPermissions);
        }
        validate_permissions(&self.permissions)
    }
}

/// Input for `rootKey.update.permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRootKeyPermissionsRequest {
    /// Root key being updated.
    pub root_key_id: RootKeyId,
    /// Complete desired permission set.
    pub permissions: Vec<PermissionName>,
}

impl UpdateRootKeyPermissionsRequest {
    /// Builds a request from a draft.
    #[must_use]
    pub fn from_draft(root_key_id: RootKeyId, draft: &RootKeyPermissionDraft) -> Self {
        Self {
            root_key_id,
            permissions: draft.merged_permissions(),
        }
    }

    /// Validates the request; an empty set is allowed and revokes everything.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] when a permission string is malformed.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        validate_permissions(&self.permissions)
    }
}

/// Validates every permission string in a request.
fn validate_permissions(permissions: &[PermissionName]) -> Result<(), SubmissionError> {
    for permission in permissions {
        permission.validate().map_err(|source| SubmissionError::InvalidPermission {
            permission: permission.to_string(),
            source,
        })?;
    }
    Ok(())
}
