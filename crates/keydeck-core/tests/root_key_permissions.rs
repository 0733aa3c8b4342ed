//! Root key permission editing tests.
//!
//! ## Purpose
//! Walk the permission picker the way a user does: search, toggle groups,
//! and submit. Checkbox values must track the selection at every step.
//!
//! ## What is covered
//! - Category and root toggles on small and built-in catalogs.
//! - Toggles scoped to a search-filtered catalog.
//! - Drafts seeded from existing keys and merged for submission.
//! - Request validation before any call is made.
// crates/keydeck-core/tests/root_key_permissions.rs
// ============================================================================
// Module: Root Key Permission Tests
// Description: End-to-end picker flows over the selection reducer.
// Purpose: Ensure selections, checkbox values, and requests stay consistent.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use keydeck_core::ApiId;
use keydeck_core::CheckState;
use keydeck_core::PermissionCatalog;
use keydeck_core::PermissionName;
use keydeck_core::PermissionSelector;
use keydeck_core::SearchTarget;
use keydeck_core::SelectionCommand;
use keydeck_core::SelectionState;
use keydeck_core::permissions::CreateRootKeyRequest;
use keydeck_core::permissions::PermissionDiff;
use keydeck_core::permissions::RootKeyPermissionDraft;
use keydeck_core::permissions::SubmissionError;
use keydeck_core::permissions::filter_catalog;
use keydeck_core::permissions::reduce;

mod support;
use crate::support::TestResult;
use crate::support::catalog;
use crate::support::ensure;

fn names(permissions: &[&str]) -> BTreeSet<PermissionName> {
    permissions.iter().map(|name| PermissionName::new(*name)).collect()
}

#[test]
fn category_toggle_selects_every_member() -> TestResult {
    let catalog = catalog(&[(
        "Keys",
        &[("create_key", "api.abc.create_key"), ("read_key", "api.abc.read_key")],
    )])?;
    let state = SelectionState::empty(&catalog);
    ensure(state.checked.root == CheckState::Unchecked, "starts unchecked")?;

    let next = reduce(
        &state,
        &catalog,
        &SelectionCommand::ToggleCategory {
            category: "Keys".to_string(),
        },
    );
    ensure(next.selected == names(&["api.abc.create_key", "api.abc.read_key"]), "both selected")?;
    ensure(next.checked.category("Keys") == CheckState::Checked, "category checked")?;
    ensure(next.checked.root == CheckState::Checked, "root checked")?;

    let back = reduce(
        &next,
        &catalog,
        &SelectionCommand::ToggleCategory {
            category: "Keys".to_string(),
        },
    );
    ensure(back.selected.is_empty(), "second toggle clears the category")?;
    Ok(())
}

#[test]
fn single_permission_makes_groups_indeterminate() -> TestResult {
    let catalog = catalog(&[
        ("Keys", &[("create_key", "api.abc.create_key"), ("read_key", "api.abc.read_key")]),
        ("API", &[("read_api", "api.abc.read_api")]),
    ])?;
    let mut selector = PermissionSelector::new(BTreeSet::new(), &catalog);
    selector.dispatch(
        &catalog,
        &SelectionCommand::TogglePermission {
            permission: PermissionName::new("api.abc.read_key"),
        },
    );
    let state = selector.state();
    ensure(state.checked.category("Keys") == CheckState::Indeterminate, "keys partial")?;
    ensure(state.checked.category("API") == CheckState::Unchecked, "api untouched")?;
    ensure(state.checked.root == CheckState::Indeterminate, "root partial")?;

    selector.dispatch(&catalog, &SelectionCommand::ToggleRoot);
    ensure(
        selector.state().checked.root == CheckState::Checked,
        "partial root toggle selects all",
    )?;
    selector.dispatch(&catalog, &SelectionCommand::ToggleRoot);
    ensure(selector.selected().is_empty(), "full root toggle clears")?;
    Ok(())
}

#[test]
fn toggles_on_filtered_catalog_only_touch_visible_permissions() -> TestResult {
    let full = PermissionCatalog::for_api(&ApiId::new("api_1"));
    let visible = filter_catalog(&full, "read", SearchTarget::Action);
    ensure(!visible.is_empty(), "search matches read actions")?;
    ensure(
        visible.permissions().all(|permission| permission.as_str().contains("read")),
        "only read actions are visible",
    )?;

    let seeded = names(&["api.api_1.delete_key"]);
    let mut selector = PermissionSelector::new(seeded, &visible);
    selector.dispatch(&visible, &SelectionCommand::ToggleRoot);
    let selected = selector.selected().clone();
    ensure(selected.contains(&PermissionName::new("api.api_1.delete_key")), "hidden kept")?;
    ensure(selected.contains(&PermissionName::new("api.api_1.read_key")), "visible selected")?;
    ensure(selector.state().checked.root == CheckState::Checked, "visible root checked")?;

    selector.refresh(&full);
    ensure(selector.state().checked.root == CheckState::Indeterminate, "full catalog partial")?;
    Ok(())
}

#[test]
fn search_with_no_matches_yields_unchecked_root() -> TestResult {
    let full = PermissionCatalog::workspace();
    let visible = filter_catalog(&full, "zzz-nothing", SearchTarget::Any);
    ensure(visible.is_empty(), "no categories survive")?;
    let everything: BTreeSet<PermissionName> = full.permissions().cloned().collect();
    let state = SelectionState::new(everything, &visible);
    ensure(state.checked.root == CheckState::Unchecked, "empty catalog never renders ticked")?;
    Ok(())
}

#[test]
fn description_search_matches_case_insensitively() -> TestResult {
    let full = PermissionCatalog::workspace();
    let visible = filter_catalog(&full, "  RATELIMIT OVERRIDES ", SearchTarget::Description);
    let actions: Vec<&str> = visible
        .categories()
        .iter()
        .flat_map(|category| category.actions.iter().map(|action| action.action.as_str()))
        .collect();
    ensure(
        actions == vec!["set_override", "read_override", "delete_override"],
        format!("got {actions:?}"),
    )?;
    Ok(())
}

#[test]
fn existing_permissions_split_into_workspace_and_api_drafts() -> TestResult {
    let existing = names(&["api.*.create_api", "api.api_1.read_key", "ratelimit.*.limit"]);
    let mut draft = RootKeyPermissionDraft::from_existing(&existing);
    ensure(draft.workspace == names(&["api.*.create_api", "ratelimit.*.limit"]), "workspace")?;
    ensure(
        draft.apis.get(&ApiId::new("api_1")) == Some(&names(&["api.api_1.read_key"])),
        "per-api selection",
    )?;

    draft.api_mut(&ApiId::new("api_2")).insert(PermissionName::new("api.api_2.read_api"));
    let merged: BTreeSet<PermissionName> = draft.merged_permissions().into_iter().collect();
    let diff = PermissionDiff::between(&existing, &merged);
    ensure(diff.added == vec![PermissionName::new("api.api_2.read_api")], "one grant")?;
    ensure(diff.removed.is_empty(), "nothing revoked")?;
    Ok(())
}

#[test]
fn create_request_requires_permissions_and_short_name() -> TestResult {
    let empty = CreateRootKeyRequest::from_draft(Some("ci"), &RootKeyPermissionDraft::new());
    ensure(empty.validate() == Err(SubmissionError::NoPermissions), "no permissions")?;

    let mut draft = RootKeyPermissionDraft::new();
    draft.workspace.insert(PermissionName::new("api.*.read_api"));
    let long_name = "x".repeat(51);
    let long = CreateRootKeyRequest::from_draft(Some(&long_name), &draft);
    ensure(
        matches!(long.validate(), Err(SubmissionError::NameTooLong { max: 50 })),
        "name over 50 characters",
    )?;

    let blank = CreateRootKeyRequest::from_draft(Some("   "), &draft);
    ensure(blank.name.is_none(), "blank names are omitted")?;
    blank.validate()?;
    Ok(())
}
