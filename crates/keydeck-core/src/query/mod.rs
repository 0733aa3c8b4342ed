// crates/keydeck-core/src/query/mod.rs
// ============================================================================
// Module: Query Building
// Description: Shared machinery for folding filters into view payloads.
// Purpose: Apply one coercion policy across every logs and chart view.
// Dependencies: crate::{diagnostics, filters}, serde, thiserror
// ============================================================================

//! ## Overview
//! Every view folds its filter list through [`fold_filters`]:
//! values that fail their field rules are dropped, disallowed operators fall
//! back to the field's first operator, and time fields feed a
//! [`window::TimeInputs`]. Each view then maps the folded conditions onto its
//! own payload and pairs it with a [`RefreshPolicy`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod granularity;
pub mod key_logs;
pub mod overview_logs;
pub mod sort;
pub mod spent_credits;
pub mod timeseries;
pub mod window;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::DiagnosticEvent;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::DropReason;
use crate::filters::Filter;
use crate::filters::FilterField;
use crate::filters::FilterOperator;
use crate::filters::FilterValue;
use crate::filters::QueryParams;
use crate::filters::decode_filters;
use crate::query::sort::read_sorts;

pub use granularity::Granularity;
pub use key_logs::KeyDetailsLogs;
pub use key_logs::KeyDetailsScope;
pub use key_logs::KeyLogsField;
pub use key_logs::KeyLogsQueryPayload;
pub use overview_logs::KeysOverviewLogs;
pub use overview_logs::KeysOverviewQueryPayload;
pub use overview_logs::KeysOverviewScope;
pub use overview_logs::OverviewLogsField;
pub use sort::SortDirection;
pub use sort::SortSpec;
pub use spent_credits::SpentCredits;
pub use spent_credits::SpentCreditsField;
pub use spent_credits::SpentCreditsPayload;
pub use timeseries::ActiveKeysTimeseries;
pub use timeseries::ApiTimeseriesField;
pub use timeseries::ApiTimeseriesScope;
pub use timeseries::TimeseriesPayload;
pub use timeseries::VerificationTimeseries;
pub use window::TimeInputs;
pub use window::TimeWindow;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default look-back when no time filter is present (12 hours).
pub const HISTORICAL_DATA_WINDOW_MS: i64 = 12 * 60 * 60 * 1_000;
/// Default refetch interval for live views.
pub const DEFAULT_LIVE_REFETCH_INTERVAL_MS: u64 = 10_000;
/// Default delay before the first verification timeseries fetch.
pub const DEFAULT_TIMESERIES_STARTUP_DELAY_MS: u64 = 1_000;
/// Default page size for log queries.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
/// Maximum page size accepted by log queries.
pub const MAX_PAGE_LIMIT: u32 = 100;
/// Maximum length of a single condition value.
pub const MAX_CONDITION_VALUE_LENGTH: usize = 256;

// ============================================================================
// SECTION: Settings and Context
// ============================================================================

/// Tunables shared by every query builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuerySettings {
    /// Look-back used when no start time is given, in milliseconds.
    pub historical_window_ms: i64,
    /// Refetch interval while a view is live, in milliseconds.
    pub live_refetch_interval_ms: u64,
    /// Delay before the first verification timeseries fetch, in milliseconds.
    pub timeseries_startup_delay_ms: u64,
    /// Page size for log queries.
    pub page_limit: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            historical_window_ms: HISTORICAL_DATA_WINDOW_MS,
            live_refetch_interval_ms: DEFAULT_LIVE_REFETCH_INTERVAL_MS,
            timeseries_startup_delay_ms: DEFAULT_TIMESERIES_STARTUP_DELAY_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Inputs shared by one round of query building.
pub struct QueryContext<'a> {
    /// Shared query timestamp ("now"), in milliseconds since epoch.
    pub now_ms: i64,
    /// Builder tunables.
    pub settings: &'a QuerySettings,
    /// Sink for dropped or coerced filters.
    pub diagnostics: &'a dyn DiagnosticSink,
}

// ============================================================================
// SECTION: Refresh Policy
// ============================================================================

/// Polling behaviour attached to a built query.
///
/// # Invariants
/// - `refetch_interval_ms` is `Some` only while the window ends at or after now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPolicy {
    /// Refetch interval in milliseconds; `None` disables polling.
    pub refetch_interval_ms: Option<u64>,
    /// One-shot delay before the first fetch, in milliseconds.
    pub startup_delay_ms: Option<u64>,
}

impl RefreshPolicy {
    /// Derives the policy for a window.
    #[must_use]
    pub fn for_window(window: &TimeWindow, ctx: &QueryContext<'_>, startup_delay: bool) -> Self {
        let refetch_interval_ms =
            window.is_live(ctx.now_ms).then_some(ctx.settings.live_refetch_interval_ms);
        let startup_delay_ms = (startup_delay && ctx.settings.timeseries_startup_delay_ms > 0)
            .then_some(ctx.settings.timeseries_startup_delay_ms);
        Self {
            refetch_interval_ms,
            startup_delay_ms,
        }
    }

    /// Returns the refetch interval.
    #[must_use]
    pub fn refetch_interval(&self) -> Option<Duration> {
        self.refetch_interval_ms.map(Duration::from_millis)
    }

    /// Returns the startup delay.
    #[must_use]
    pub fn startup_delay(&self) -> Option<Duration> {
        self.startup_delay_ms.map(Duration::from_millis)
    }

    /// Returns true when the query is live-tailing.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.refetch_interval_ms.is_some()
    }
}

/// Payload paired with its polling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltQuery<P> {
    /// Backend procedure the payload is sent to.
    pub procedure: &'static str,
    /// Validated-shape payload.
    pub payload: P,
    /// Polling behaviour.
    pub refresh: RefreshPolicy,
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Operator/value pair sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Operator.
    pub operator: FilterOperator,
    /// Value.
    pub value: String,
}

/// Payload validation errors, mirroring the backend input schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Page limit outside the accepted range.
    #[error("limit must be between 1 and {max} (got {actual})")]
    Limit {
        /// Maximum allowed limit.
        max: u32,
        /// Observed limit.
        actual: u32,
    },
    /// Start time after end time, or negative.
    #[error("invalid time window: start {start} end {end}")]
    TimeWindow {
        /// Window start.
        start: i64,
        /// Window end.
        end: i64,
    },
    /// Condition value empty or too long.
    #[error("invalid {field} condition value")]
    ConditionValue {
        /// Field name.
        field: &'static str,
    },
    /// Identifier missing.
    #[error("{0} must not be empty")]
    MissingId(&'static str),
}

/// Payload sent across the RPC boundary.
pub trait QueryPayload: Serialize {
    /// Checks the payload against the backend input schema.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] describing the first violation.
    fn validate(&self) -> Result<(), PayloadError>;
}

/// Checks a time window against the backend schema.
pub(crate) const fn validate_window(start: i64, end: i64) -> Result<(), PayloadError> {
    if start < 0 || start > end {
        return Err(PayloadError::TimeWindow {
            start,
            end,
        });
    }
    Ok(())
}

/// Checks a page limit against the backend schema.
pub(crate) const fn validate_limit(limit: u32) -> Result<(), PayloadError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(PayloadError::Limit {
            max: MAX_PAGE_LIMIT,
            actual: limit,
        });
    }
    Ok(())
}

/// Checks condition values against the backend schema.
pub(crate) fn validate_conditions(
    field: &'static str,
    conditions: &[FilterCondition],
) -> Result<(), PayloadError> {
    let invalid = conditions.iter().any(|condition| {
        condition.value.is_empty() || condition.value.len() > MAX_CONDITION_VALUE_LENGTH
    });
    if invalid {
        return Err(PayloadError::ConditionValue {
            field,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Field Roles and Folding
// ============================================================================

/// How a view field contributes to the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Operator/value condition list.
    Condition,
    /// Explicit window start.
    StartTime,
    /// Explicit window end.
    EndTime,
    /// Relative window (`24h`).
    Since,
}

/// Field enum of a query view.
pub trait ViewField: FilterField {
    /// Role of the field in the payload.
    fn role(self) -> FieldRole;
}

/// Filters folded into per-field conditions and time inputs.
#[derive(Debug, Clone)]
pub struct FoldedFilters<F> {
    /// Conditions keyed by field.
    conditions: BTreeMap<F, Vec<FilterCondition>>,
    /// Time inputs gathered from time fields.
    pub time: TimeInputs,
}

impl<F: ViewField> FoldedFilters<F> {
    /// Removes and returns the conditions for `field`.
    pub fn take(&mut self, field: F) -> Vec<FilterCondition> {
        self.conditions.remove(&field).unwrap_or_default()
    }
}

/// Folds a filter list, applying the shared coercion policy.
pub fn fold_filters<F: ViewField>(
    filters: &[Filter<F>],
    diagnostics: &dyn DiagnosticSink,
) -> FoldedFilters<F> {
    let mut folded = FoldedFilters {
        conditions: BTreeMap::new(),
        time: TimeInputs::default(),
    };
    for filter in filters {
        let field = filter.field;
        let config = field.config();
        let value = match config.accept_value(&filter.value) {
            Ok(value) => value,
            Err(reason) => {
                report(diagnostics, F::VIEW, field.as_str(), reason, &filter.value);
                continue;
            }
        };
        let (operator, coerced) = config.resolve_operator(filter.operator);
        if coerced {
            report(diagnostics, F::VIEW, field.as_str(), DropReason::OperatorFallback, &value);
        }
        match (field.role(), &value) {
            (FieldRole::StartTime, FilterValue::Number(ms)) => folded.time.start_time = Some(*ms),
            (FieldRole::EndTime, FilterValue::Number(ms)) => folded.time.end_time = Some(*ms),
            (FieldRole::Since, _) => folded.time.since = Some(value.to_param_string()),
            (FieldRole::Condition, _) => {
                folded.conditions.entry(field).or_default().push(FilterCondition {
                    operator,
                    value: value.to_param_string(),
                });
            }
            (FieldRole::StartTime | FieldRole::EndTime, FilterValue::Text(_)) => {
                report(diagnostics, F::VIEW, field.as_str(), DropReason::NotNumeric, &value);
            }
        }
    }
    folded
}

/// Records a diagnostic for a filter value.
fn report(
    diagnostics: &dyn DiagnosticSink,
    view: &'static str,
    field: &str,
    reason: DropReason,
    value: &FilterValue,
) {
    diagnostics.record(&DiagnosticEvent::new(view, field, reason, Some(value.to_param_string())));
}

// ============================================================================
// SECTION: Untyped Filters
// ============================================================================

/// Filter as received from an untyped source (JSON, form input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    /// Field name.
    pub field: String,
    /// Operator token.
    pub operator: String,
    /// Value.
    pub value: FilterValue,
}

/// Resolves untyped filters against a view's fields.
///
/// Unknown fields are dropped; unknown operator tokens fall back to the
/// field's first allowed operator. Value checks happen later, when folding.
pub fn resolve_raw_filters<F: FilterField>(
    raw: &[RawFilter],
    diagnostics: &dyn DiagnosticSink,
) -> Vec<Filter<F>> {
    raw.iter()
        .filter_map(|filter| {
            let Some(field) = F::parse(&filter.field) else {
                let reason = DropReason::UnknownField;
                report(diagnostics, F::VIEW, &filter.field, reason, &filter.value);
                return None;
            };
            let operator = FilterOperator::parse(&filter.operator).unwrap_or_else(|| {
                report(
                    diagnostics,
                    F::VIEW,
                    &filter.field,
                    DropReason::OperatorFallback,
                    &filter.value,
                );
                field.config().fallback_operator()
            });
            Some(Filter::new(field, operator, filter.value.clone()))
        })
        .collect()
}

// ============================================================================
// SECTION: Views
// ============================================================================

/// Everything a view builder consumes besides its scope.
#[derive(Debug, Clone)]
pub struct ViewInput<F> {
    /// Current filters.
    pub filters: Vec<Filter<F>>,
    /// Current sort order.
    pub sorts: Vec<SortSpec>,
    /// Pagination cursor.
    pub cursor: Option<i64>,
}

impl<F> Default for ViewInput<F> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
            cursor: None,
        }
    }
}

/// One logs or chart view and its payload builder.
pub trait QueryView {
    /// Field enum of the view.
    type Field: ViewField;
    /// Identifiers the view is scoped to.
    type Scope;
    /// Backend payload.
    type Payload: QueryPayload;

    /// Backend procedure name.
    const PROCEDURE: &'static str;
    /// Sortable columns; empty when the view is unsorted.
    const SORT_COLUMNS: &'static [&'static str] = &[];

    /// Folds the input into a payload and refresh policy.
    fn build(
        scope: &Self::Scope,
        input: &ViewInput<Self::Field>,
        ctx: &QueryContext<'_>,
    ) -> BuiltQuery<Self::Payload>;

    /// Decodes filters and sorts from query params, then builds.
    fn build_from_params(
        scope: &Self::Scope,
        params: &QueryParams,
        cursor: Option<i64>,
        ctx: &QueryContext<'_>,
    ) -> BuiltQuery<Self::Payload> {
        let input = ViewInput {
            filters: decode_filters(params, ctx.diagnostics),
            sorts: read_sorts(
                params,
                Self::SORT_COLUMNS,
                <Self::Field as FilterField>::VIEW,
                ctx.diagnostics,
            ),
            cursor,
        };
        Self::build(scope, &input, ctx)
    }
}
