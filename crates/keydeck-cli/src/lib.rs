// crates/keydeck-cli/src/lib.rs
// ============================================================================
// Module: Keydeck CLI Library
// Description: Shared helpers for the Keydeck command-line interface.
// Purpose: Provide reusable components (i18n, rendering) for the binary and tests.
// Dependencies: keydeck-core, serde
// ============================================================================

//! ## Overview
//! This library houses the message catalog and the permission renderers used
//! by `src/main.rs`. Keeping them here lets unit tests exercise output
//! formatting without spawning the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Text and JSON renderers for permission catalogs.
pub mod render;
