// crates/keydeck-core/src/permissions/mod.rs
// ============================================================================
// Module: Root Key Permissions
// Description: Catalogs, search, selection reducer, and submission helpers.
// Purpose: Compose RBAC permission sets for root keys.
// Dependencies: crate::permissions::{catalog, search, selection, submission}
// ============================================================================

//! ## Overview
//! Permission editing flows through four steps: pick a catalog, optionally
//! narrow it with a search, dispatch toggles against the visible catalog, and
//! merge the per-catalog selections into a mutation request.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod search;
pub mod selection;
pub mod submission;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogError;
pub use catalog::CatalogScope;
pub use catalog::PermissionAction;
pub use catalog::PermissionCatalog;
pub use catalog::PermissionCategory;
pub use catalog::PermissionEntry;
pub use search::SearchTarget;
pub use search::filter_catalog;
pub use selection::CheckedStates;
pub use selection::PermissionSelector;
pub use selection::SelectionCommand;
pub use selection::SelectionState;
pub use selection::compute_checked_states;
pub use selection::reduce;
pub use selection::toggle_category;
pub use selection::toggle_permission;
pub use selection::toggle_root;
pub use submission::CreateRootKeyRequest;
pub use submission::PermissionDiff;
pub use submission::RootKeyPermissionDraft;
pub use submission::SubmissionError;
pub use submission::UpdateRootKeyPermissionsRequest;
pub use submission::merged_permissions;
