// crates/keydeck-core/src/runtime/mutations.rs
// ============================================================================
// Module: Root Key Mutations
// Description: Validated create, update, and revoke flows for root keys.
// Purpose: Turn drafts into RPC calls and failures into user notices.
// Dependencies: crate::{core, interfaces, permissions}
// ============================================================================

//! ## Overview
//! Requests are validated locally before any call is made. Validation and
//! backend failures both come back as an error [`Notice`]; the backend
//! message is passed through unchanged and nothing is retried.

use std::collections::BTreeSet;

use crate::core::PermissionName;
use crate::core::RootKeyId;
use crate::interfaces::CreatedRootKey;
use crate::interfaces::DashboardRpc;
use crate::interfaces::Notice;
use crate::permissions::CreateRootKeyRequest;
use crate::permissions::PermissionDiff;
use crate::permissions::RootKeyPermissionDraft;
use crate::permissions::UpdateRootKeyPermissionsRequest;

/// Notice title for failed creations.
pub const CREATE_FAILED_TITLE: &str = "Failed to create root key";
/// Notice title for failed permission updates.
pub const UPDATE_FAILED_TITLE: &str = "Failed to update permissions";
/// Notice title for failed permission removals.
pub const REMOVE_FAILED_TITLE: &str = "Failed to remove permission";

/// Root key mutation helper bound to an RPC implementation.
pub struct RootKeyEditor<'a, R: ?Sized> {
    /// Backend.
    rpc: &'a R,
}

impl<'a, R: DashboardRpc + ?Sized> RootKeyEditor<'a, R> {
    /// Binds the editor to `rpc`.
    #[must_use]
    pub const fn new(rpc: &'a R) -> Self {
        Self {
            rpc,
        }
    }

    /// Creates a root key from a draft.
    ///
    /// # Errors
    ///
    /// Returns an error [`Notice`] when validation or the call fails.
    pub fn create(
        &self,
        name: Option<&str>,
        draft: &RootKeyPermissionDraft,
    ) -> Result<CreatedRootKey, Notice> {
        let request = CreateRootKeyRequest::from_draft(name, draft);
        request.validate().map_err(|err| Notice::error(CREATE_FAILED_TITLE, err.to_string()))?;
        self.rpc
            .create_root_key(&request)
            .map_err(|err| Notice::from_mutation_error(CREATE_FAILED_TITLE, &err))
    }

    /// Replaces a root key's permissions with the draft's merged set.
    ///
    /// Returns the applied diff; an empty diff makes no call.
    ///
    /// # Errors
    ///
    /// Returns an error [`Notice`] when validation or the call fails.
    pub fn update_permissions(
        &self,
        root_key_id: &RootKeyId,
        current: &BTreeSet<PermissionName>,
        draft: &RootKeyPermissionDraft,
    ) -> Result<PermissionDiff, Notice> {
        let request = UpdateRootKeyPermissionsRequest::from_draft(root_key_id.clone(), draft);
        let desired: BTreeSet<PermissionName> = request.permissions.iter().cloned().collect();
        let diff = PermissionDiff::between(current, &desired);
        if diff.is_empty() {
            return Ok(diff);
        }
        request.validate().map_err(|err| Notice::error(UPDATE_FAILED_TITLE, err.to_string()))?;
        self.rpc
            .update_root_key_permissions(&request)
            .map_err(|err| Notice::from_mutation_error(UPDATE_FAILED_TITLE, &err))?;
        Ok(diff)
    }

    /// Revokes one permission, returning the remaining set.
    ///
    /// # Errors
    ///
    /// Returns an error [`Notice`] when validation or the call fails.
    pub fn remove_permission(
        &self,
        root_key_id: &RootKeyId,
        current: &BTreeSet<PermissionName>,
        permission: &PermissionName,
    ) -> Result<BTreeSet<PermissionName>, Notice> {
        let mut remaining = current.clone();
        if !remaining.remove(permission) {
            return Ok(remaining);
        }
        let request = UpdateRootKeyPermissionsRequest {
            root_key_id: root_key_id.clone(),
            permissions: remaining.iter().cloned().collect(),
        };
        request.validate().map_err(|err| Notice::error(REMOVE_FAILED_TITLE, err.to_string()))?;
        self.rpc
            .update_root_key_permissions(&request)
            .map_err(|err| Notice::from_mutation_error(REMOVE_FAILED_TITLE, &err))?;
        Ok(remaining)
    }
}
