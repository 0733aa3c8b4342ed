// crates/keydeck-core/src/core/tristate.rs
// ============================================================================
// Module: Tri-State Checkbox Values
// Description: Checked, unchecked, and indeterminate selection states.
// Purpose: Derive group checkbox states from member selection counts.
// Dependencies: serde::{Deserialize, Serialize}
// ============================================================================

//! ## Overview
//! A group (a permission category, or a whole catalog) is `Checked` when all
//! of its members are selected, `Unchecked` when none are, and `Indeterminate`
//! otherwise. Empty groups derive `Unchecked` so that a search that hides
//! every member never renders a ticked box.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Tri-State Value
// ============================================================================

/// Tri-state checkbox value for grouped selections.
///
/// # Invariants
/// - Represents a closed set: checked, unchecked, or indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// Every member of the group is selected.
    Checked,
    /// No member of the group is selected.
    Unchecked,
    /// Some, but not all, members are selected.
    Indeterminate,
}

impl CheckState {
    /// Derives the state from the number of selected members and the group size.
    #[must_use]
    pub const fn from_counts(selected: usize, total: usize) -> Self {
        if total == 0 || selected == 0 {
            Self::Unchecked
        } else if selected >= total {
            Self::Checked
        } else {
            Self::Indeterminate
        }
    }

    /// Returns the checkbox glyph used by text renderers.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Checked => "[x]",
            Self::Unchecked => "[ ]",
            Self::Indeterminate => "[-]",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
