// crates/keydeck-core/src/diagnostics.rs
// ============================================================================
// Module: Filter Diagnostics
// Description: Structured events for filter input that was dropped or coerced.
// Purpose: Record "ignore and continue" decisions without surfacing errors.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Malformed filter input never reaches the user as an error. Instead the
//! filter is dropped (or its operator coerced) and a [`DiagnosticEvent`] is
//! handed to a [`DiagnosticSink`]. Sinks emit JSON lines so deployments can
//! route them into whatever log pipeline they already run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Why a filter value was dropped or altered.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The field is not supported by the view.
    UnknownField,
    /// The stored operator token is not a known operator.
    UnknownOperator,
    /// The operator is not allowed for the field; the first allowed one was used.
    OperatorFallback,
    /// A numeric field received a non-numeric value.
    NotNumeric,
    /// An enum field received a value outside its allow-list.
    NotAllowed,
    /// A relative time window could not be parsed.
    InvalidDuration,
    /// A stored parameter item could not be decoded.
    MalformedParam,
    /// A sort specification referenced an unknown column or direction.
    InvalidSort,
}

/// Diagnostic event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// View that processed the filter.
    pub view: &'static str,
    /// Field name as it appeared in the input.
    pub field: String,
    /// Reason for the drop or coercion.
    pub reason: DropReason,
    /// Offending value when available.
    pub value: Option<String>,
}

impl DiagnosticEvent {
    /// Creates a new event with a consistent timestamp.
    #[must_use]
    pub fn new(
        view: &'static str,
        field: impl Into<String>,
        reason: DropReason,
        value: Option<String>,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let event = if matches!(reason, DropReason::OperatorFallback) {
            "filter_coerced"
        } else {
            "filter_dropped"
        };
        Self {
            event,
            timestamp_ms,
            view,
            field: field.into(),
            reason,
            value,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for filter diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic event.
    fn record(&self, event: &DiagnosticEvent);
}

/// Sink that discards every event.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Sink that logs JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
pub struct FileDiagnosticSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileDiagnosticSink {
    /// Opens the diagnostics log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps events in memory, in arrival order.
#[derive(Default)]
pub struct MemoryDiagnosticSink {
    /// Recorded events.
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemoryDiagnosticSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Returns the recorded reasons, in arrival order.
    #[must_use]
    pub fn reasons(&self) -> Vec<DropReason> {
        self.events().iter().map(|event| event.reason).collect()
    }
}

impl DiagnosticSink for MemoryDiagnosticSink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
