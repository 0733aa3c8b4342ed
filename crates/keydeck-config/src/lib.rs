// crates/keydeck-config/src/lib.rs
// ============================================================================
// Module: Keydeck Config Library
// Description: Canonical config model and validation for Keydeck tools.
// Purpose: Single source of truth for keydeck.toml semantics.
// Dependencies: keydeck-core, serde, toml
// ============================================================================

//! ## Overview
//! `keydeck-config` defines the configuration model shared by Keydeck tools.
//! Validation is strict and fails closed: out-of-range values and unknown
//! keys are rejected rather than clamped or ignored.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
