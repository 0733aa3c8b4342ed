// crates/keydeck-cli/src/render.rs
// ============================================================================
// Module: Permission Renderers
// Description: Text and JSON views of a catalog and its selection.
// Purpose: Keep permission output formatting out of the command dispatcher.
// Dependencies: keydeck-core, serde
// ============================================================================

//! ## Overview
//! [`CatalogView`] is the serializable projection used for `--format json`;
//! [`render_text`] draws the same data as an indented checkbox tree.

// ============================================================================
// SECTION: Imports
// ============================================================================

use keydeck_core::CatalogScope;
use keydeck_core::CheckState;
use keydeck_core::PermissionCatalog;
use keydeck_core::PermissionName;
use keydeck_core::SelectionState;
use serde::Serialize;

use crate::t;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Serializable catalog with checkbox values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    /// Catalog scope.
    pub scope: CatalogScope,
    /// Search text applied to the catalog, if any.
    pub search: Option<String>,
    /// Select-all checkbox.
    pub root: CheckState,
    /// Visible categories in declaration order.
    pub categories: Vec<CategoryView>,
    /// Full selection, including permissions hidden by the search.
    pub selected: Vec<PermissionName>,
}

/// One category row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    /// Category name.
    pub name: String,
    /// Category checkbox.
    pub state: CheckState,
    /// Actions in declaration order.
    pub actions: Vec<ActionView>,
}

/// One permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    /// Action name.
    pub action: String,
    /// Permission string.
    pub permission: PermissionName,
    /// Description.
    pub description: String,
    /// Whether the permission is selected.
    pub selected: bool,
}

impl CatalogView {
    /// Projects `catalog` and `state` into a view.
    #[must_use]
    pub fn new(catalog: &PermissionCatalog, state: &SelectionState, search: Option<&str>) -> Self {
        let categories = catalog
            .categories()
            .iter()
            .map(|category| CategoryView {
                name: category.name.clone(),
                state: state.checked.category(&category.name),
                actions: category
                    .actions
                    .iter()
                    .map(|action| ActionView {
                        action: action.action.clone(),
                        permission: action.entry.permission.clone(),
                        description: action.entry.description.clone(),
                        selected: state.selected.contains(&action.entry.permission),
                    })
                    .collect(),
            })
            .collect();
        Self {
            scope: catalog.scope().clone(),
            search: search.map(str::to_string),
            root: state.checked.root,
            categories,
            selected: state.selected.iter().cloned().collect(),
        }
    }
}

// ============================================================================
// SECTION: Text Output
// ============================================================================

/// Renders the view as an indented checkbox tree.
#[must_use]
pub fn render_text(view: &CatalogView) -> String {
    let mut lines = Vec::new();
    lines.push(match &view.scope {
        CatalogScope::Workspace => t!("permissions.header.workspace", glyph = view.root.glyph()),
        CatalogScope::Api(api_id) => {
            t!("permissions.header.api", glyph = view.root.glyph(), api_id = api_id.as_str())
        }
    });
    if view.categories.is_empty() {
        lines.push(t!("permissions.empty", search = view.search.as_deref().unwrap_or_default()));
    }
    for category in &view.categories {
        let glyph = category.state.glyph();
        lines.push(t!("permissions.category", glyph = glyph, name = category.name));
        for action in &category.actions {
            let glyph = if action.selected {
                CheckState::Checked.glyph()
            } else {
                CheckState::Unchecked.glyph()
            };
            lines.push(t!(
                "permissions.entry",
                glyph = glyph,
                action = action.action,
                permission = action.permission.as_str(),
                description = action.description,
            ));
        }
    }
    lines.push(t!("permissions.selected", count = view.selected.len()));
    lines.join("\n")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use keydeck_core::ApiId;
    use keydeck_core::PermissionCatalog;
    use keydeck_core::PermissionName;
    use keydeck_core::SearchTarget;
    use keydeck_core::SelectionState;
    use keydeck_core::permissions::filter_catalog;

    use super::CatalogView;
    use super::render_text;

    #[test]
    fn text_marks_partial_category_indeterminate() {
        let catalog = PermissionCatalog::for_api(&ApiId::new("api_1"));
        let keys = catalog.category("Keys").map(|c| c.actions.len()).unwrap_or_default();
        assert!(keys > 1);
        let first = catalog.category("Keys").and_then(|c| c.permissions().next().cloned());
        let selected: BTreeSet<PermissionName> = first.into_iter().collect();
        let state = SelectionState::new(selected, &catalog);
        let text = render_text(&CatalogView::new(&catalog, &state, None));
        assert!(text.starts_with("[-] API api_1 permissions"));
        assert!(text.contains("  [-] Keys"));
        assert!(text.ends_with("Selected: 1"));
    }

    #[test]
    fn empty_search_result_says_so() {
        let catalog = filter_catalog(
            &PermissionCatalog::workspace(),
            "zzz-nothing",
            SearchTarget::Any,
        );
        let state = SelectionState::empty(&catalog);
        let text = render_text(&CatalogView::new(&catalog, &state, Some("zzz-nothing")));
        assert!(text.contains("No permissions match zzz-nothing."));
        assert!(text.starts_with("[ ] Workspace permissions"));
    }

    #[test]
    fn json_view_keeps_hidden_selection() {
        let hidden = PermissionName::new("api.*.delete_api");
        let catalog =
            filter_catalog(&PermissionCatalog::workspace(), "override", SearchTarget::Action);
        let state = SelectionState::new(BTreeSet::from([hidden.clone()]), &catalog);
        let view = CatalogView::new(&catalog, &state, Some("override"));
        assert_eq!(view.selected, vec![hidden]);
        let json = serde_json::to_value(&view).unwrap_or_default();
        assert_eq!(json["root"], "unchecked");
        assert_eq!(json["scope"]["kind"], "workspace");
    }
}
