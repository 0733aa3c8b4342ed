// crates/keydeck-core/src/core/outcome.rs
// ============================================================================
// Module: Verification Outcomes
// Description: Outcome taxonomy, display labels, colours, and severity buckets.
// Purpose: Keep table rows, badges, and tooltips visually consistent.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every key verification ends in one outcome. Views label outcomes by
//! title-casing the code, colour them with a fixed class per outcome, and
//! grade a row's error share into a severity bucket:
//! `>= 50%` high, `>= 20%` moderate, `> 0%` low, otherwise none.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Outcome codes accepted by outcome filters, in display order.
pub const KEY_VERIFICATION_OUTCOMES: &[&str] = &[
    "VALID",
    "RATE_LIMITED",
    "INSUFFICIENT_PERMISSIONS",
    "FORBIDDEN",
    "DISABLED",
    "EXPIRED",
    "USAGE_EXCEEDED",
];

/// Error share (percent) at or above which severity is high.
const HIGH_SEVERITY_PERCENT: u64 = 50;
/// Error share (percent) at or above which severity is moderate.
const MODERATE_SEVERITY_PERCENT: u64 = 20;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Categorical result of a key verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    /// The key was valid.
    Valid,
    /// The key hit its rate limit.
    RateLimited,
    /// The key lacked a required permission.
    InsufficientPermissions,
    /// The key was not allowed to access the resource.
    Forbidden,
    /// The key is disabled.
    Disabled,
    /// The key has expired.
    Expired,
    /// The key exhausted its remaining uses.
    UsageExceeded,
}

impl VerificationOutcome {
    /// All outcomes in display order.
    pub const ALL: [Self; 7] = [
        Self::Valid,
        Self::RateLimited,
        Self::InsufficientPermissions,
        Self::Forbidden,
        Self::Disabled,
        Self::Expired,
        Self::UsageExceeded,
    ];

    /// Returns the wire code for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::RateLimited => "RATE_LIMITED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Forbidden => "FORBIDDEN",
            Self::Disabled => "DISABLED",
            Self::Expired => "EXPIRED",
            Self::UsageExceeded => "USAGE_EXCEEDED",
        }
    }

    /// Parses a wire code. Matching is exact.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|outcome| outcome.as_str() == code)
    }

    /// Returns the display label (e.g. `Rate Limited`).
    #[must_use]
    pub fn label(self) -> String {
        format_outcome_label(self.as_str())
    }

    /// Returns the colour class used for badges and chart series.
    #[must_use]
    pub const fn color_class(self) -> &'static str {
        match self {
            Self::Valid => "bg-accent-9",
            Self::RateLimited => "bg-warning-9",
            Self::InsufficientPermissions => "bg-error-9",
            Self::Forbidden => "bg-error-11",
            Self::Disabled => "bg-gray-9",
            Self::Expired => "bg-orange-9",
            Self::UsageExceeded => "bg-feature-9",
        }
    }

    /// Returns true for every outcome other than `Valid`.
    #[must_use]
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Valid)
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats an outcome code as a title-cased label.
///
/// Underscores separate words; each word keeps its first character upper
/// case and lowers the rest. Empty codes render as `Unknown`.
#[must_use]
pub fn format_outcome_label(code: &str) -> String {
    let words: Vec<String> = code
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                let mut out: String = first.to_uppercase().collect();
                out.push_str(&chars.as_str().to_lowercase());
                out
            })
        })
        .collect();
    if words.is_empty() { "Unknown".to_string() } else { words.join(" ") }
}

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Error-share severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No errors.
    None,
    /// Under 20% errors.
    Low,
    /// At least 20% but under 50% errors.
    Moderate,
    /// At least 50% errors.
    High,
}

impl Severity {
    /// Returns a stable label for the bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    /// Returns the colour class used for severity badges.
    #[must_use]
    pub const fn color_class(self) -> &'static str {
        match self {
            Self::None => "text-gray-11",
            Self::Low => "text-warning-11",
            Self::Moderate => "text-orange-11",
            Self::High => "text-error-11",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the error share in percent; zero when there is no traffic.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "Display-only percentage of request counts.")]
pub fn error_percentage(valid_count: u64, error_count: u64) -> f64 {
    let total = valid_count.saturating_add(error_count);
    if total == 0 {
        return 0.0;
    }
    (error_count as f64 / total as f64) * 100.0
}

/// Buckets a valid/error count pair into a severity.
///
/// Thresholds compare in integer space so boundaries are exact.
#[must_use]
pub fn classify_severity(valid_count: u64, error_count: u64) -> Severity {
    let total = u128::from(valid_count) + u128::from(error_count);
    if total == 0 || error_count == 0 {
        return Severity::None;
    }
    let scaled_errors = u128::from(error_count) * 100;
    if scaled_errors >= total * u128::from(HIGH_SEVERITY_PERCENT) {
        Severity::High
    } else if scaled_errors >= total * u128::from(MODERATE_SEVERITY_PERCENT) {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

// ============================================================================
// SECTION: Outcome Counts
// ============================================================================

/// Per-outcome verification counts for one row or bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeCounts {
    /// Valid verifications.
    pub valid: u64,
    /// Rate-limited verifications.
    pub rate_limited: u64,
    /// Verifications lacking permissions.
    pub insufficient_permissions: u64,
    /// Forbidden verifications.
    pub forbidden: u64,
    /// Verifications of disabled keys.
    pub disabled: u64,
    /// Verifications of expired keys.
    pub expired: u64,
    /// Verifications past the usage limit.
    pub usage_exceeded: u64,
}

impl OutcomeCounts {
    /// Adds `count` verifications with the given outcome.
    pub const fn record(&mut self, outcome: VerificationOutcome, count: u64) {
        let slot = match outcome {
            VerificationOutcome::Valid => &mut self.valid,
            VerificationOutcome::RateLimited => &mut self.rate_limited,
            VerificationOutcome::InsufficientPermissions => &mut self.insufficient_permissions,
            VerificationOutcome::Forbidden => &mut self.forbidden,
            VerificationOutcome::Disabled => &mut self.disabled,
            VerificationOutcome::Expired => &mut self.expired,
            VerificationOutcome::UsageExceeded => &mut self.usage_exceeded,
        };
        *slot = slot.saturating_add(count);
    }

    /// Returns the count recorded for one outcome.
    #[must_use]
    pub const fn get(&self, outcome: VerificationOutcome) -> u64 {
        match outcome {
            VerificationOutcome::Valid => self.valid,
            VerificationOutcome::RateLimited => self.rate_limited,
            VerificationOutcome::InsufficientPermissions => self.insufficient_permissions,
            VerificationOutcome::Forbidden => self.forbidden,
            VerificationOutcome::Disabled => self.disabled,
            VerificationOutcome::Expired => self.expired,
            VerificationOutcome::UsageExceeded => self.usage_exceeded,
        }
    }

    /// Returns the number of non-valid verifications.
    #[must_use]
    pub fn error_count(&self) -> u64 {
        VerificationOutcome::ALL
            .into_iter()
            .filter(|outcome| outcome.is_error())
            .fold(0_u64, |acc, outcome| acc.saturating_add(self.get(outcome)))
    }

    /// Returns the total number of verifications.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.valid.saturating_add(self.error_count())
    }

    /// Returns the severity of this row's error share.
    #[must_use]
    pub fn severity(&self) -> Severity {
        classify_severity(self.valid, self.error_count())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
