// crates/keydeck-core/src/query/window.rs
// ============================================================================
// Module: Time Windows
// Description: Resolution of explicit and relative time filters into a window.
// Purpose: Give every view the same [start, end] semantics.
// Dependencies: crate::diagnostics, serde
// ============================================================================

//! ## Overview
//! A valid relative window (`since`) wins and yields `[now - since, now]`.
//! Otherwise explicit bounds are used: a missing end means now, and a missing
//! start means one historical window before the end.

use serde::Serialize;

use crate::diagnostics::DiagnosticEvent;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::DropReason;

/// Milliseconds per relative-duration unit.
const UNITS: &[(char, i64)] =
    &[('s', 1_000), ('m', 60_000), ('h', 3_600_000), ('d', 86_400_000), ('w', 604_800_000)];

/// Time inputs collected from filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeInputs {
    /// Explicit start (ms since epoch).
    pub start_time: Option<i64>,
    /// Explicit end (ms since epoch).
    pub end_time: Option<i64>,
    /// Relative window such as `24h`.
    pub since: Option<String>,
}

/// Resolved time window.
///
/// # Invariants
/// - `start_time <= end_time` unless explicit bounds were given inverted.
/// - `since` is set only when it parsed and drove the bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Window start (ms since epoch).
    pub start_time: i64,
    /// Window end (ms since epoch).
    pub end_time: i64,
    /// Relative window that produced the bounds.
    pub since: Option<String>,
}

impl TimeWindow {
    /// Returns the window length in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }

    /// Returns true when the window reaches the present.
    #[must_use]
    pub const fn is_live(&self, now_ms: i64) -> bool {
        self.end_time >= now_ms
    }

    /// Resolves inputs against `now_ms`, reporting an unparseable `since`.
    #[must_use]
    pub fn resolve(
        inputs: &TimeInputs,
        now_ms: i64,
        historical_window_ms: i64,
        view: &'static str,
        diagnostics: &dyn DiagnosticSink,
    ) -> Self {
        if let Some(since) = inputs.since.as_deref() {
            match parse_relative_duration(since) {
                Some(duration) => {
                    return Self {
                        start_time: now_ms.saturating_sub(duration),
                        end_time: now_ms,
                        since: Some(since.to_string()),
                    };
                }
                None => diagnostics.record(&DiagnosticEvent::new(
                    view,
                    "since",
                    DropReason::InvalidDuration,
                    Some(since.to_string()),
                )),
            }
        }
        let end_time = inputs.end_time.unwrap_or(now_ms);
        let start_time =
            inputs.start_time.unwrap_or_else(|| end_time.saturating_sub(historical_window_ms));
        Self {
            start_time,
            end_time,
            since: None,
        }
    }
}

/// Parses `30m`, `24h`, `7d`, `1w`, or concatenations such as `1d12h`.
///
/// Returns `None` for empty, zero, unitless, or overflowing input.
#[must_use]
pub fn parse_relative_duration(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let mut total: i64 = 0;
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let (_, unit_ms) = UNITS.iter().find(|(unit, _)| *unit == ch.to_ascii_lowercase())?;
        if digits.is_empty() {
            return None;
        }
        let amount: i64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(*unit_ms)?)?;
        digits.clear();
    }
    if !digits.is_empty() || total == 0 {
        return None;
    }
    Some(total)
}
