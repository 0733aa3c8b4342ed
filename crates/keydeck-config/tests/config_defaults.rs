//! Default value tests for keydeck-config.
// crates/keydeck-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults Tests
// Description: Defaults, file loading, and sink construction.
// Purpose: Ensure an empty config matches the built-in query settings.
// =============================================================================

use std::fs;

use keydeck_config::DiagnosticSinkKind;
use keydeck_config::KeydeckConfig;
use keydeck_core::DiagnosticEvent;
use keydeck_core::DropReason;
use keydeck_core::QuerySettings;

mod common;

use common::assert_invalid;
use common::minimal_config;
use common::write_config;

type TestResult = Result<(), String>;

#[test]
fn empty_config_matches_builtin_settings() -> TestResult {
    let config = minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.query_settings() != QuerySettings::default() {
        return Err(format!("unexpected settings: {:?}", config.query_settings()));
    }
    if config.diagnostics.sink != DiagnosticSinkKind::Stderr {
        return Err("default sink should be stderr".to_string());
    }
    Ok(())
}

#[test]
fn partial_section_keeps_other_defaults() -> TestResult {
    let config = KeydeckConfig::from_toml_str("[queries]\npage_limit = 25\n")
        .map_err(|err| err.to_string())?;
    let settings = config.query_settings();
    if settings.page_limit != 25 {
        return Err(format!("page_limit = {}", settings.page_limit));
    }
    if settings.live_refetch_interval_ms != QuerySettings::default().live_refetch_interval_ms {
        return Err("refetch interval should keep its default".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_explicit_path() -> TestResult {
    let (_dir, path) = write_config(
        b"[queries]\nhistorical_window_ms = 3600000\ntimeseries_startup_delay_ms = 0\n",
    )?;
    let config = KeydeckConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    let settings = config.query_settings();
    if settings.historical_window_ms != 3_600_000 || settings.timeseries_startup_delay_ms != 0 {
        return Err(format!("unexpected settings: {settings:?}"));
    }
    Ok(())
}

#[test]
fn load_missing_explicit_path_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(KeydeckConfig::load(Some(&path)), "config io error")?;
    assert_invalid(KeydeckConfig::load_or_default(Some(&path)), "config io error")
}

#[test]
fn file_sink_appends_json_lines() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log = dir.path().join("diagnostics.log");
    let toml = format!("[diagnostics]\nsink = \"file\"\npath = {:?}\n", log.display().to_string());
    let config = KeydeckConfig::from_toml_str(&toml).map_err(|err| err.to_string())?;
    let sink = config.diagnostics_sink().map_err(|err| err.to_string())?;
    sink.record(&DiagnosticEvent::new(
        "keys_overview_logs",
        "outcomes",
        DropReason::NotAllowed,
        Some("NOT_REAL".to_string()),
    ));
    let text = fs::read_to_string(&log).map_err(|err| err.to_string())?;
    if text.lines().count() != 1 || !text.contains("NOT_REAL") {
        return Err(format!("unexpected log contents: {text}"));
    }
    Ok(())
}

#[test]
fn none_sink_opens_without_path() -> TestResult {
    let config = KeydeckConfig::from_toml_str("[diagnostics]\nsink = \"none\"\n")
        .map_err(|err| err.to_string())?;
    config.diagnostics_sink().map(|_| ()).map_err(|err| err.to_string())
}
