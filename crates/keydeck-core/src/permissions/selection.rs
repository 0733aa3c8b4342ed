// crates/keydeck-core/src/permissions/selection.rs
// ============================================================================
// Module: Permission Selection Reducer
// Description: Pure transitions over a selected-permission set.
// Purpose: Toggle permissions, categories, or whole catalogs and derive
//          tri-state checkbox values.
// Dependencies: crate::core, crate::permissions::catalog, serde
// ============================================================================

//! ## Overview
//! The reducer knows about exactly one catalog per call. Callers that edit
//! several catalogs at once (workspace plus each API) keep one selection per
//! catalog and merge them when submitting. Passing a search-filtered catalog
//! scopes every toggle to the visible subset; hidden permissions keep their
//! prior membership.
//!
//! ## Invariants
//! - Toggles never touch permissions outside the catalog (or category) given.
//! - `checked` is always the result of [`compute_checked_states`] over the
//!   catalog the last transition was applied to.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::CheckState;
use crate::core::PermissionName;
use crate::permissions::catalog::PermissionCatalog;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Derived checkbox values for a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedStates {
    /// State of the "select all" checkbox.
    pub root: CheckState,
    /// State of each category checkbox, keyed by category name.
    pub categories: BTreeMap<String, CheckState>,
}

impl CheckedStates {
    /// Returns the state for a category; unknown categories are unchecked.
    #[must_use]
    pub fn category(&self, name: &str) -> CheckState {
        self.categories.get(name).copied().unwrap_or(CheckState::Unchecked)
    }
}

/// Selection plus its derived checkbox values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected permission strings.
    pub selected: BTreeSet<PermissionName>,
    /// Checkbox values derived from `selected`.
    pub checked: CheckedStates,
}

impl SelectionState {
    /// Builds a state from an existing selection, deriving checkbox values.
    #[must_use]
    pub fn new(selected: BTreeSet<PermissionName>, catalog: &PermissionCatalog) -> Self {
        let checked = compute_checked_states(&selected, catalog);
        Self {
            selected,
            checked,
        }
    }

    /// Builds an empty selection for a catalog.
    #[must_use]
    pub fn empty(catalog: &PermissionCatalog) -> Self {
        Self::new(BTreeSet::new(), catalog)
    }
}

/// User actions accepted by the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionCommand {
    /// Select or deselect every permission in the catalog.
    ToggleRoot,
    /// Select or deselect every permission in one category.
    ToggleCategory {
        /// Category name.
        category: String,
    },
    /// Flip one permission.
    TogglePermission {
        /// Permission string.
        permission: PermissionName,
    },
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

/// Recomputes root and category checkbox values from scratch.
#[must_use]
pub fn compute_checked_states(
    selected: &BTreeSet<PermissionName>,
    catalog: &PermissionCatalog,
) -> CheckedStates {
    let mut categories = BTreeMap::new();
    let mut total = 0;
    let mut total_selected = 0;
    for category in catalog.categories() {
        let size = category.actions.len();
        let chosen = category.permissions().filter(|p| selected.contains(*p)).count();
        total += size;
        total_selected += chosen;
        categories.insert(category.name.clone(), CheckState::from_counts(chosen, size));
    }
    CheckedStates {
        root: CheckState::from_counts(total_selected, total),
        categories,
    }
}

/// Selects every catalog permission, or deselects them all when all are selected.
#[must_use]
pub fn toggle_root(
    selected: &BTreeSet<PermissionName>,
    catalog: &PermissionCatalog,
) -> BTreeSet<PermissionName> {
    toggle_group(selected, &catalog.permissions().collect::<Vec<_>>())
}

/// Same as [`toggle_root`] scoped to one category; unknown names are a no-op.
#[must_use]
pub fn toggle_category(
    selected: &BTreeSet<PermissionName>,
    catalog: &PermissionCatalog,
    category: &str,
) -> BTreeSet<PermissionName> {
    catalog
        .category(category)
        .map_or_else(
            || selected.clone(),
            |found| toggle_group(selected, &found.permissions().collect::<Vec<_>>()),
        )
}

/// Flips membership of exactly one permission.
#[must_use]
pub fn toggle_permission(
    selected: &BTreeSet<PermissionName>,
    permission: &PermissionName,
) -> BTreeSet<PermissionName> {
    let mut next = selected.clone();
    if !next.remove(permission) {
        next.insert(permission.clone());
    }
    next
}

/// Applies one command and re-derives checkbox values.
#[must_use]
pub fn reduce(
    state: &SelectionState,
    catalog: &PermissionCatalog,
    command: &SelectionCommand,
) -> SelectionState {
    let selected = match command {
        SelectionCommand::ToggleRoot => toggle_root(&state.selected, catalog),
        SelectionCommand::ToggleCategory {
            category,
        } => toggle_category(&state.selected, catalog, category),
        SelectionCommand::TogglePermission {
            permission,
        } => toggle_permission(&state.selected, permission),
    };
    SelectionState::new(selected, catalog)
}

/// All-or-nothing toggle over a group of permissions.
fn toggle_group(
    selected: &BTreeSet<PermissionName>,
    group: &[&PermissionName],
) -> BTreeSet<PermissionName> {
    let mut next = selected.clone();
    let all_selected = group.iter().all(|permission| selected.contains(*permission));
    if all_selected {
        for permission in group {
            next.remove(*permission);
        }
    } else {
        next.extend(group.iter().map(|permission| (*permission).clone()));
    }
    next
}

// ============================================================================
// SECTION: Stateful Selector
// ============================================================================

/// Mutable wrapper around [`reduce`] for callers holding one live selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSelector {
    /// Current selection state.
    state: SelectionState,
}

impl PermissionSelector {
    /// Creates a selector seeded with `selected`.
    #[must_use]
    pub fn new(selected: BTreeSet<PermissionName>, catalog: &PermissionCatalog) -> Self {
        Self {
            state: SelectionState::new(selected, catalog),
        }
    }

    /// Applies a command against the (possibly filtered) visible catalog.
    pub fn dispatch(&mut self, catalog: &PermissionCatalog, command: &SelectionCommand) {
        self.state = reduce(&self.state, catalog, command);
    }

    /// Re-derives checkbox values after the visible catalog changed.
    pub fn refresh(&mut self, catalog: &PermissionCatalog) {
        self.state.checked = compute_checked_states(&self.state.selected, catalog);
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Returns the selected permissions.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<PermissionName> {
        &self.state.selected
    }
}
