// crates/keydeck-core/src/permissions/catalog.rs
// ============================================================================
// Module: Permission Catalogs
// Description: Static category/action trees of root-key permissions.
// Purpose: Define the workspace-wide and per-API permission catalogs.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! A catalog maps `category -> action -> entry`, where each entry carries a
//! human description and the RBAC permission string it grants. Declaration
//! order is preserved because it is the order checkboxes are rendered in.
//! Two catalogs are built in: the workspace catalog (wildcard resources) and
//! the per-API catalog (resource bound to one API id).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ApiId;
use crate::core::PermissionName;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scope a catalog applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "api_id", rename_all = "snake_case")]
pub enum CatalogScope {
    /// Workspace-wide permissions.
    Workspace,
    /// Permissions bound to a single API.
    Api(ApiId),
}

/// Description and permission string for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    /// Human-readable description shown next to the checkbox.
    pub description: String,
    /// Permission string granted by the action.
    pub permission: PermissionName,
}

/// Named action inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAction {
    /// Action name (e.g. `read_key`).
    pub action: String,
    /// Entry granted by the action.
    #[serde(flatten)]
    pub entry: PermissionEntry,
}

/// Ordered group of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCategory {
    /// Category name (e.g. `Keys`).
    pub name: String,
    /// Actions in declaration order.
    pub actions: Vec<PermissionAction>,
}

impl PermissionCategory {
    /// Returns the permission strings of every action in the category.
    pub fn permissions(&self) -> impl Iterator<Item = &PermissionName> {
        self.actions.iter().map(|action| &action.entry.permission)
    }
}

/// Ordered permission catalog for one scope.
///
/// # Invariants
/// - Category names are unique; action names are unique within a category.
/// - Every permission string appears at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCatalog {
    /// Scope of the catalog.
    scope: CatalogScope,
    /// Categories in declaration order.
    categories: Vec<PermissionCategory>,
}

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Category name was empty.
    #[error("category name must not be empty")]
    EmptyCategoryName,
    /// Category name appeared twice.
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    /// Action name appeared twice in one category.
    #[error("duplicate action {action} in category {category}")]
    DuplicateAction {
        /// Category containing the duplicate.
        category: String,
        /// Duplicated action name.
        action: String,
    },
    /// Permission string appeared twice in the catalog.
    #[error("duplicate permission: {0}")]
    DuplicatePermission(String),
}

impl PermissionCatalog {
    /// Builds a catalog after checking uniqueness invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when names or permissions collide.
    pub fn new(
        scope: CatalogScope,
        categories: Vec<PermissionCategory>,
    ) -> Result<Self, CatalogError> {
        let mut seen_categories = BTreeSet::new();
        let mut seen_permissions = BTreeSet::new();
        for category in &categories {
            if category.name.trim().is_empty() {
                return Err(CatalogError::EmptyCategoryName);
            }
            if !seen_categories.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.name.clone()));
            }
            let mut seen_actions = BTreeSet::new();
            for action in &category.actions {
                if !seen_actions.insert(action.action.as_str()) {
                    return Err(CatalogError::DuplicateAction {
                        category: category.name.clone(),
                        action: action.action.clone(),
                    });
                }
                if !seen_permissions.insert(action.entry.permission.as_str()) {
                    return Err(CatalogError::DuplicatePermission(
                        action.entry.permission.to_string(),
                    ));
                }
            }
        }
        Ok(Self {
            scope,
            categories,
        })
    }

    /// Builds a subset of an already valid catalog.
    pub(crate) const fn subset(scope: CatalogScope, categories: Vec<PermissionCategory>) -> Self {
        Self {
            scope,
            categories,
        }
    }

    /// Returns the workspace-wide catalog.
    #[must_use]
    pub fn workspace() -> Self {
        let categories = WORKSPACE_CATALOG
            .iter()
            .map(|(name, actions)| build_category(name, actions, "*"))
            .collect();
        Self::subset(CatalogScope::Workspace, categories)
    }

    /// Returns the catalog for a single API.
    #[must_use]
    pub fn for_api(api_id: &ApiId) -> Self {
        let categories = API_CATALOG
            .iter()
            .map(|(name, actions)| build_category(name, actions, api_id.as_str()))
            .collect();
        Self::subset(CatalogScope::Api(api_id.clone()), categories)
    }

    /// Returns the catalog scope.
    #[must_use]
    pub const fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    /// Returns the categories in declaration order.
    #[must_use]
    pub fn categories(&self) -> &[PermissionCategory] {
        &self.categories
    }

    /// Looks up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&PermissionCategory> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Returns every permission string in declaration order.
    pub fn permissions(&self) -> impl Iterator<Item = &PermissionName> {
        self.categories.iter().flat_map(PermissionCategory::permissions)
    }

    /// Returns true when the catalog grants `permission`.
    #[must_use]
    pub fn contains(&self, permission: &PermissionName) -> bool {
        self.permissions().any(|candidate| candidate == permission)
    }

    /// Returns the number of permissions in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.iter().map(|category| category.actions.len()).sum()
    }

    /// Returns true when the catalog has no permissions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// SECTION: Built-In Definitions
// ============================================================================

/// Action template: `(action, description, resource kind)`.
type ActionTemplate = (&'static str, &'static str, &'static str);

/// Workspace catalog templates; resources are the `*` wildcard.
const WORKSPACE_CATALOG: &[(&str, &[ActionTemplate])] = &[
    (
        "API",
        &[
            ("create_api", "Create new APIs in this workspace.", "api"),
            ("delete_api", "Delete APIs in this workspace.", "api"),
            ("read_api", "Read information about APIs in this workspace.", "api"),
            ("update_api", "Update APIs in this workspace.", "api"),
            ("create_key", "Create new keys in this workspace.", "api"),
            ("update_key", "Update keys in this workspace.", "api"),
            ("delete_key", "Delete keys in this workspace.", "api"),
            ("encrypt_key", "Encrypt keys belonging to this workspace.", "api"),
            ("decrypt_key", "Decrypt keys belonging to this workspace.", "api"),
            ("read_key", "Read information about keys in this workspace.", "api"),
            ("read_analytics", "Read verification analytics for this workspace.", "api"),
        ],
    ),
    (
        "Ratelimit",
        &[
            ("create_namespace", "Create new ratelimit namespaces.", "ratelimit"),
            ("read_namespace", "Read information about ratelimit namespaces.", "ratelimit"),
            ("limit", "Ratelimit requests against any namespace.", "ratelimit"),
            ("update_namespace", "Update ratelimit namespaces.", "ratelimit"),
            ("delete_namespace", "Delete ratelimit namespaces.", "ratelimit"),
            ("set_override", "Set ratelimit overrides for identifiers.", "ratelimit"),
            ("read_override", "Read ratelimit overrides.", "ratelimit"),
            ("delete_override", "Delete ratelimit overrides.", "ratelimit"),
        ],
    ),
    (
        "Permissions",
        &[
            ("create_role", "Create new roles.", "rbac"),
            ("read_role", "Read information about roles.", "rbac"),
            ("update_role", "Update roles.", "rbac"),
            ("delete_role", "Delete roles.", "rbac"),
            ("create_permission", "Create new permissions.", "rbac"),
            ("read_permission", "Read information about permissions.", "rbac"),
            ("update_permission", "Update permissions.", "rbac"),
            ("delete_permission", "Delete permissions.", "rbac"),
            ("add_permission_to_key", "Attach permissions directly to keys.", "rbac"),
            ("remove_permission_from_key", "Remove permissions from keys.", "rbac"),
            ("add_role_to_key", "Attach roles to keys.", "rbac"),
            ("remove_role_from_key", "Remove roles from keys.", "rbac"),
            ("add_permission_to_role", "Attach permissions to roles.", "rbac"),
            ("remove_permission_from_role", "Remove permissions from roles.", "rbac"),
        ],
    ),
    (
        "Identities",
        &[
            ("create_identity", "Create new identities.", "identity"),
            ("read_identity", "Read information about identities.", "identity"),
            ("update_identity", "Update identities.", "identity"),
            ("delete_identity", "Delete identities.", "identity"),
        ],
    ),
];

/// Per-API catalog templates; resources are the API id.
const API_CATALOG: &[(&str, &[ActionTemplate])] = &[
    (
        "API",
        &[
            ("read_api", "Read information about this API.", "api"),
            ("update_api", "Update this API.", "api"),
            ("delete_api", "Delete this API.", "api"),
        ],
    ),
    (
        "Keys",
        &[
            ("create_key", "Create new keys for this API.", "api"),
            ("read_key", "Read information about keys of this API.", "api"),
            ("update_key", "Update keys of this API.", "api"),
            ("delete_key", "Delete keys of this API.", "api"),
            ("encrypt_key", "Encrypt keys belonging to this API.", "api"),
            ("decrypt_key", "Decrypt keys belonging to this API.", "api"),
            ("read_analytics", "Read verification analytics for this API.", "api"),
        ],
    ),
];

/// Expands a category template for a resource id.
fn build_category(name: &str, actions: &[ActionTemplate], resource: &str) -> PermissionCategory {
    PermissionCategory {
        name: name.to_string(),
        actions: actions
            .iter()
            .map(|(action, description, kind)| PermissionAction {
                action: (*action).to_string(),
                entry: PermissionEntry {
                    description: (*description).to_string(),
                    permission: PermissionName::new(format!("{kind}.{resource}.{action}")),
                },
            })
            .collect(),
    }
}
