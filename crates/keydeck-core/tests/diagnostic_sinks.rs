//! Diagnostic sink tests.
//!
//! ## Purpose
//! Dropped and coerced filter values are logged as JSON lines. These tests
//! check the line format written by the file sink.
// crates/keydeck-core/tests/diagnostic_sinks.rs
// ============================================================================
// Module: Diagnostic Sink Tests
// Description: JSON-lines output of the file diagnostic sink.
// Purpose: Ensure diagnostics are appended as parseable events.
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

use std::fs;

use keydeck_core::DiagnosticEvent;
use keydeck_core::DiagnosticSink;
use keydeck_core::DropReason;
use keydeck_core::FileDiagnosticSink;
use keydeck_core::Filter;
use keydeck_core::FilterOperator;
use keydeck_core::QueryContext;
use keydeck_core::QuerySettings;
use keydeck_core::QueryView;
use keydeck_core::ViewInput;
use keydeck_core::query::KeyDetailsLogs;
use keydeck_core::query::KeyDetailsScope;
use keydeck_core::query::KeyLogsField;
use serde_json::Value;
use tempfile::TempDir;

mod support;
use crate::support::TestResult;
use crate::support::ensure;

#[test]
fn file_sink_appends_one_json_line_per_event() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("diagnostics.jsonl");
    let sink = FileDiagnosticSink::new(&path)?;
    sink.record(&DiagnosticEvent::new(
        "keys_overview_logs",
        "outcomes",
        DropReason::NotAllowed,
        Some("NOT_REAL".to_string()),
    ));
    sink.record(&DiagnosticEvent::new(
        "keys_overview_logs",
        "names",
        DropReason::OperatorFallback,
        None,
    ));

    let contents = fs::read_to_string(&path)?;
    let lines: Vec<Value> =
        contents.lines().map(serde_json::from_str).collect::<Result<_, _>>()?;
    ensure(lines.len() == 2, "two lines written")?;
    ensure(lines[0]["event"] == "filter_dropped", "drop event name")?;
    ensure(lines[0]["reason"] == "not_allowed", "snake_case reason")?;
    ensure(lines[0]["value"] == "NOT_REAL", "value recorded")?;
    ensure(lines[1]["event"] == "filter_coerced", "coercion event name")?;
    ensure(lines[1]["value"].is_null(), "missing value is null")?;
    Ok(())
}

#[test]
fn builders_report_through_the_file_sink() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("builder.jsonl");
    let sink = FileDiagnosticSink::new(&path)?;
    let settings = QuerySettings::default();
    let ctx = QueryContext {
        now_ms: 1_700_000_000_000,
        settings: &settings,
        diagnostics: &sink,
    };
    let scope = KeyDetailsScope {
        key_id: "key_1".into(),
        keyspace_id: "ks_1".into(),
    };
    let input = ViewInput {
        filters: vec![Filter::new(KeyLogsField::Outcomes, FilterOperator::Is, "MAYBE")],
        ..ViewInput::default()
    };
    let built = KeyDetailsLogs::build(&scope, &input, &ctx);
    ensure(built.payload.outcomes.is_empty(), "invalid outcome dropped")?;

    let contents = fs::read_to_string(&path)?;
    let line: Value = serde_json::from_str(contents.trim())?;
    ensure(line["view"] == "key_details_logs", "view recorded")?;
    ensure(line["field"] == "outcomes", "field recorded")?;
    Ok(())
}
