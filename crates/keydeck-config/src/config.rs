// crates/keydeck-config/src/config.rs
// ============================================================================
// Module: Keydeck Configuration
// Description: Configuration loading and validation for Keydeck.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: keydeck-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, else `KEYDECK_CONFIG`, else `keydeck.toml`
//! in the working directory. Every section is optional and defaults to the
//! dashboard's built-in query settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use keydeck_core::DiagnosticSink;
use keydeck_core::FileDiagnosticSink;
use keydeck_core::NoopDiagnosticSink;
use keydeck_core::QuerySettings;
use keydeck_core::StderrDiagnosticSink;
use keydeck_core::query::DEFAULT_LIVE_REFETCH_INTERVAL_MS;
use keydeck_core::query::DEFAULT_PAGE_LIMIT;
use keydeck_core::query::DEFAULT_TIMESERIES_STARTUP_DELAY_MS;
use keydeck_core::query::HISTORICAL_DATA_WINDOW_MS;
use keydeck_core::query::MAX_PAGE_LIMIT;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "keydeck.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "KEYDECK_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum historical window: one minute.
pub const MIN_HISTORICAL_WINDOW_MS: i64 = 60_000;
/// Maximum historical window: ninety days.
pub const MAX_HISTORICAL_WINDOW_MS: i64 = 90 * 24 * 60 * 60 * 1_000;
/// Minimum live refetch interval.
pub const MIN_REFETCH_INTERVAL_MS: u64 = 1_000;
/// Maximum live refetch interval.
pub const MAX_REFETCH_INTERVAL_MS: u64 = 10 * 60 * 1_000;
/// Maximum chart startup delay.
pub const MAX_STARTUP_DELAY_MS: u64 = 30_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Keydeck configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeydeckConfig {
    /// Query builder settings.
    #[serde(default)]
    pub queries: QueriesConfig,
    /// Filter diagnostics output.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl KeydeckConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Like [`Self::load`], but a missing default file yields the defaults.
    ///
    /// An explicit path or `KEYDECK_CONFIG` that does not exist is still an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some() || env::var_os(CONFIG_ENV_VAR).is_some();
        if !explicit && !Path::new(DEFAULT_CONFIG_NAME).exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.queries.validate()?;
        self.diagnostics.validate()
    }

    /// Returns the query builder settings.
    #[must_use]
    pub const fn query_settings(&self) -> QuerySettings {
        QuerySettings {
            historical_window_ms: self.queries.historical_window_ms,
            live_refetch_interval_ms: self.queries.live_refetch_interval_ms,
            timeseries_startup_delay_ms: self.queries.timeseries_startup_delay_ms,
            page_limit: self.queries.page_limit,
        }
    }

    /// Opens the configured diagnostics sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn diagnostics_sink(&self) -> Result<Arc<dyn DiagnosticSink>, ConfigError> {
        self.diagnostics.open()
    }
}

/// Query builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueriesConfig {
    /// Window length used when no start is given.
    pub historical_window_ms: i64,
    /// Refetch interval for windows that reach the present.
    pub live_refetch_interval_ms: u64,
    /// Delay before the first verification chart fetch; zero disables it.
    pub timeseries_startup_delay_ms: u64,
    /// Page size for log queries.
    pub page_limit: u32,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            historical_window_ms: HISTORICAL_DATA_WINDOW_MS,
            live_refetch_interval_ms: DEFAULT_LIVE_REFETCH_INTERVAL_MS,
            timeseries_startup_delay_ms: DEFAULT_TIMESERIES_STARTUP_DELAY_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl QueriesConfig {
    /// Validates query bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.historical_window_ms < MIN_HISTORICAL_WINDOW_MS
            || self.historical_window_ms > MAX_HISTORICAL_WINDOW_MS
        {
            return Err(ConfigError::Invalid(format!(
                "queries.historical_window_ms must be between {MIN_HISTORICAL_WINDOW_MS} and \
                 {MAX_HISTORICAL_WINDOW_MS} milliseconds",
            )));
        }
        validate_range(
            "queries.live_refetch_interval_ms",
            self.live_refetch_interval_ms,
            MIN_REFETCH_INTERVAL_MS,
            MAX_REFETCH_INTERVAL_MS,
        )?;
        validate_range(
            "queries.timeseries_startup_delay_ms",
            self.timeseries_startup_delay_ms,
            0,
            MAX_STARTUP_DELAY_MS,
        )?;
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "queries.page_limit must be between 1 and {MAX_PAGE_LIMIT}",
            )));
        }
        Ok(())
    }
}

/// Where filter diagnostics are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Diagnostics are discarded.
    None,
}

/// Diagnostics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Sink kind.
    pub sink: DiagnosticSinkKind,
    /// Log file path; required for the file sink.
    pub path: Option<String>,
}

impl DiagnosticsConfig {
    /// Validates sink settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink lacks a valid path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (DiagnosticSinkKind::File, None) => Err(ConfigError::Invalid(
                "diagnostics.path is required when diagnostics.sink = \"file\"".to_string(),
            )),
            (_, Some(path)) => validate_path_string("diagnostics.path", path),
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn open(&self) -> Result<Arc<dyn DiagnosticSink>, ConfigError> {
        match self.sink {
            DiagnosticSinkKind::Stderr => Ok(Arc::new(StderrDiagnosticSink)),
            DiagnosticSinkKind::None => Ok(Arc::new(NoopDiagnosticSink)),
            DiagnosticSinkKind::File => {
                let Some(path) = self.path.as_deref() else {
                    return Err(ConfigError::Invalid("diagnostics.path must be set".to_string()));
                };
                let sink = FileDiagnosticSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a millisecond value against inclusive bounds.
fn validate_range(field: &str, value_ms: u64, min_ms: u64, max_ms: u64) -> Result<(), ConfigError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between {min_ms} and {max_ms} milliseconds",
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
