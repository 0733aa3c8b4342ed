// crates/keydeck-core/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers and fixtures for keydeck-core tests.
// ============================================================================
//! ## Overview
//! Result-based assertions plus small catalog fixtures shared across suites.

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
    dead_code,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

use keydeck_core::ApiId;
use keydeck_core::CatalogScope;
use keydeck_core::PermissionCatalog;
use keydeck_core::PermissionEntry;
use keydeck_core::PermissionName;
use keydeck_core::permissions::PermissionAction;
use keydeck_core::permissions::PermissionCategory;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Standard result type used across integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Lightweight error type for test assertions.
#[derive(Debug)]
struct TestError {
    /// Human-readable failure message.
    message: String,
}

impl fmt::Display for TestError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl Error for TestError {}

/// Returns an error when a test condition fails.
///
/// # Errors
/// Returns a `TestError` when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition {
        Ok(())
    } else {
        Err(Box::new(TestError {
            message: message.into(),
        }))
    }
}

// ========================================================================
// Fixtures
// ========================================================================

/// Builds a catalog from `(category, [(action, permission)])` pairs.
///
/// # Errors
/// Returns the catalog error when names collide.
pub fn catalog(categories: &[(&str, &[(&str, &str)])]) -> TestResult<PermissionCatalog> {
    let categories = categories
        .iter()
        .map(|(name, actions)| PermissionCategory {
            name: (*name).to_string(),
            actions: actions
                .iter()
                .map(|(action, permission)| PermissionAction {
                    action: (*action).to_string(),
                    entry: PermissionEntry {
                        description: format!("Allows {action}"),
                        permission: PermissionName::new(*permission),
                    },
                })
                .collect(),
        })
        .collect();
    Ok(PermissionCatalog::new(CatalogScope::Api(ApiId::new("abc")), categories)?)
}
