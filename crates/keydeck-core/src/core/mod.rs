// crates/keydeck-core/src/core/mod.rs
// ============================================================================
// Module: Keydeck Core Types
// Description: Shared identifiers, tri-state values, and outcome taxonomy.
// Purpose: Provide the vocabulary every other module builds on.
// Dependencies: crate::core::{identifiers, outcome, tristate}
// ============================================================================

//! ## Overview
//! Core types are deliberately small and serializable. Validation of
//! identifiers happens at submission boundaries, not inside the wrappers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod outcome;
pub mod tristate;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::ApiId;
pub use identifiers::KeyId;
pub use identifiers::KeyspaceId;
pub use identifiers::PermissionName;
pub use identifiers::PermissionNameError;
pub use identifiers::RootKeyId;
pub use outcome::KEY_VERIFICATION_OUTCOMES;
pub use outcome::OutcomeCounts;
pub use outcome::Severity;
pub use outcome::VerificationOutcome;
pub use outcome::classify_severity;
pub use outcome::error_percentage;
pub use outcome::format_outcome_label;
pub use tristate::CheckState;
