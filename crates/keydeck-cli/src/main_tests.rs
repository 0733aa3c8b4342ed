// crates/keydeck-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and dispatcher helpers.
// Purpose: Ensure flag combinations parse as documented and helpers fail closed.
// Dependencies: keydeck-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises clap parsing for the toggle group and the small formatting
//! helpers behind `outcome severity` and `query build`.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use keydeck_core::ApiId;
use keydeck_core::PermissionCatalog;
use keydeck_core::SelectionCommand;

use super::Cli;
use super::Commands;
use super::PermissionsCommand;
use super::ViewArg;
use super::require;
use super::severity_line;
use super::toggle_command;
use super::view_name;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("keydeck").chain(args.iter().copied()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn toggle_requires_exactly_one_target() {
    assert!(parse(&["permissions", "toggle"]).is_err());
    assert!(parse(&["permissions", "toggle", "--root", "--category", "Keys"]).is_err());
    assert!(parse(&["permissions", "toggle", "--category", "Keys"]).is_ok());
}

#[test]
fn toggle_category_maps_to_reducer_command() {
    let cli = parse(&["permissions", "toggle", "--api", "api_1", "--category", "Keys"]).unwrap();
    let Some(Commands::Permissions {
        command: PermissionsCommand::Toggle(command),
    }) = cli.command
    else {
        panic!("expected permissions toggle");
    };
    let catalog = PermissionCatalog::for_api(&ApiId::new("api_1"));
    let toggle = toggle_command(&command, &catalog).unwrap();
    assert_eq!(
        toggle,
        SelectionCommand::ToggleCategory {
            category: "Keys".to_string()
        }
    );
}

#[test]
fn toggle_unknown_category_is_rejected() {
    let cli = parse(&["permissions", "toggle", "--category", "Billing"]).unwrap();
    let Some(Commands::Permissions {
        command: PermissionsCommand::Toggle(command),
    }) = cli.command
    else {
        panic!("expected permissions toggle");
    };
    let err = toggle_command(&command, &PermissionCatalog::workspace()).unwrap_err();
    assert_eq!(err.to_string(), "Unknown category Billing.");
}

#[test]
fn severity_line_reports_bucket_and_share() {
    assert_eq!(severity_line(0, 0), "none (0.00% errors)");
    assert_eq!(severity_line(80, 20), "moderate (20.00% errors)");
    assert_eq!(severity_line(1, 1), "high (50.00% errors)");
}

#[test]
fn require_rejects_blank_scope_flags() {
    assert_eq!(require(Some(" api_1 "), "api-id", ViewArg::SpentCredits).unwrap(), "api_1");
    let err = require(Some("  "), "key-id", ViewArg::KeyDetailsLogs).unwrap_err();
    assert_eq!(err.to_string(), "--key-id is required for view key-details-logs.");
    assert!(require(None, "api-id", ViewArg::KeysOverviewLogs).is_err());
}

#[test]
fn view_names_match_command_line_values() {
    assert_eq!(view_name(ViewArg::VerificationTimeseries), "verification-timeseries");
    assert_eq!(view_name(ViewArg::ActiveKeysTimeseries), "active-keys-timeseries");
}
