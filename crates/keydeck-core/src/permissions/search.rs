// crates/keydeck-core/src/permissions/search.rs
// ============================================================================
// Module: Permission Catalog Search
// Description: Case-insensitive narrowing of a permission catalog.
// Purpose: Produce the visible catalog subset the reducer operates on.
// Dependencies: crate::permissions::catalog, serde
// ============================================================================

//! ## Overview
//! Search keeps the entries whose action name and/or description contain the
//! trimmed search text, ignoring case, and drops categories left empty. A
//! blank search returns the catalog unchanged. The result is always a subset
//! of the input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::permissions::catalog::PermissionAction;
use crate::permissions::catalog::PermissionCatalog;
use crate::permissions::catalog::PermissionCategory;

// ============================================================================
// SECTION: Search Target
// ============================================================================

/// Which entry text a search matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTarget {
    /// Match the action name.
    #[default]
    Action,
    /// Match the description.
    Description,
    /// Match either the action name or the description.
    Any,
}

impl SearchTarget {
    /// Returns true when `action` matches the lowered `needle`.
    fn matches(self, action: &PermissionAction, needle: &str) -> bool {
        let in_action = || action.action.to_lowercase().contains(needle);
        let in_description = || action.entry.description.to_lowercase().contains(needle);
        match self {
            Self::Action => in_action(),
            Self::Description => in_description(),
            Self::Any => in_action() || in_description(),
        }
    }
}

// ============================================================================
// SECTION: Filtering
// ============================================================================

/// Returns the subset of `catalog` matching `search`.
#[must_use]
pub fn filter_catalog(
    catalog: &PermissionCatalog,
    search: &str,
    target: SearchTarget,
) -> PermissionCatalog {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.clone();
    }
    let categories = catalog
        .categories()
        .iter()
        .filter_map(|category| {
            let actions: Vec<PermissionAction> = category
                .actions
                .iter()
                .filter(|action| target.matches(action, &needle))
                .cloned()
                .collect();
            if actions.is_empty() {
                None
            } else {
                Some(PermissionCategory {
                    name: category.name.clone(),
                    actions,
                })
            }
        })
        .collect();
    PermissionCatalog::subset(catalog.scope().clone(), categories)
}
