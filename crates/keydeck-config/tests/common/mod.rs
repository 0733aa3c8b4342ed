// crates/keydeck-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for keydeck-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use keydeck_config::ConfigError;
use keydeck_config::KeydeckConfig;
use tempfile::TempDir;

/// Parses a TOML string into a `KeydeckConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<KeydeckConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a config with all defaults applied.
pub fn minimal_config() -> Result<KeydeckConfig, toml::de::Error> {
    config_from_toml("")
}

/// Writes `contents` to `keydeck.toml` inside a fresh temp dir.
pub fn write_config(contents: &[u8]) -> Result<(TempDir, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("keydeck.toml");
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Asserts a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message:?} did not contain {needle:?}"))
            }
        }
        Ok(_) => Err(format!("expected error containing {needle:?}")),
    }
}
