// crates/keydeck-core/src/query/timeseries.rs
// ============================================================================
// Module: API Timeseries
// Description: Filter fields and payload builders for per-API charts.
// Purpose: Drive the verification and active-keys charts from filter state.
// Dependencies: crate::{core, filters, query}, serde
// ============================================================================

//! ## Overview
//! Both charts share one field set and payload shape. They differ in the
//! procedure they call and in the startup delay: the verification chart waits
//! briefly so the logs table above it loads first.

use serde::Serialize;

use crate::core::ApiId;
use crate::core::KEY_VERIFICATION_OUTCOMES;
use crate::filters::FilterField;
use crate::filters::FilterFieldConfig;
use crate::filters::FilterMetadata;
use crate::filters::FilterValue;
use crate::query::BuiltQuery;
use crate::query::FieldRole;
use crate::query::FilterCondition;
use crate::query::PayloadError;
use crate::query::QueryContext;
use crate::query::QueryPayload;
use crate::query::QueryView;
use crate::query::RefreshPolicy;
use crate::query::ViewField;
use crate::query::ViewInput;
use crate::query::fold_filters;
use crate::query::granularity::Granularity;
use crate::query::overview_logs::outcome_metadata;
use crate::query::validate_conditions;
use crate::query::validate_window;
use crate::query::window::TimeWindow;

/// Filterable fields of the per-API charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiTimeseriesField {
    /// Key identifier.
    KeyIds,
    /// Key name.
    Names,
    /// Owning identity.
    Identities,
    /// Verification outcome.
    Outcomes,
    /// Request tag.
    Tags,
    /// Window start.
    StartTime,
    /// Window end.
    EndTime,
    /// Relative window.
    Since,
}

impl FilterField for ApiTimeseriesField {
    const VIEW: &'static str = "api_timeseries";

    fn all() -> &'static [Self] {
        &[
            Self::KeyIds,
            Self::Names,
            Self::Identities,
            Self::Outcomes,
            Self::Tags,
            Self::StartTime,
            Self::EndTime,
            Self::Since,
        ]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::KeyIds => "keyIds",
            Self::Names => "names",
            Self::Identities => "identities",
            Self::Outcomes => "outcomes",
            Self::Tags => "tags",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Since => "since",
        }
    }

    fn config(self) -> FilterFieldConfig {
        match self {
            Self::KeyIds | Self::Names | Self::Identities | Self::Tags => {
                FilterFieldConfig::text_array()
            }
            Self::Outcomes => FilterFieldConfig::enum_array(KEY_VERIFICATION_OUTCOMES),
            Self::StartTime | Self::EndTime => FilterFieldConfig::number_scalar(),
            Self::Since => FilterFieldConfig::text_scalar(),
        }
    }

    fn metadata_for(self, value: &FilterValue) -> Option<FilterMetadata> {
        outcome_metadata(self == Self::Outcomes, value)
    }
}

impl ViewField for ApiTimeseriesField {
    fn role(self) -> FieldRole {
        match self {
            Self::StartTime => FieldRole::StartTime,
            Self::EndTime => FieldRole::EndTime,
            Self::Since => FieldRole::Since,
            Self::KeyIds | Self::Names | Self::Identities | Self::Outcomes | Self::Tags => {
                FieldRole::Condition
            }
        }
    }
}

/// Identifiers the per-API charts are scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTimeseriesScope {
    /// API whose keys are charted.
    pub api_id: ApiId,
}

/// Payload shared by `keys.timeseries` and `keys.activeKeysTimeseries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesPayload {
    /// API whose keys are charted.
    pub api_id: ApiId,
    /// Window start.
    pub start_time: i64,
    /// Window end.
    pub end_time: i64,
    /// Relative window, when it drove the bounds.
    pub since: Option<String>,
    /// Bucket size.
    pub granularity: Granularity,
    /// Key id conditions.
    pub key_ids: Vec<FilterCondition>,
    /// Key name conditions.
    pub names: Vec<FilterCondition>,
    /// Identity conditions.
    pub identities: Vec<FilterCondition>,
    /// Outcome conditions.
    pub outcomes: Vec<FilterCondition>,
    /// Tag conditions.
    pub tags: Vec<FilterCondition>,
}

impl QueryPayload for TimeseriesPayload {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.api_id.as_str().is_empty() {
            return Err(PayloadError::MissingId("apiId"));
        }
        validate_window(self.start_time, self.end_time)?;
        validate_conditions("keyIds", &self.key_ids)?;
        validate_conditions("names", &self.names)?;
        validate_conditions("identities", &self.identities)?;
        validate_conditions("outcomes", &self.outcomes)?;
        validate_conditions("tags", &self.tags)
    }
}

/// Builds the shared chart payload.
fn build_timeseries(
    procedure: &'static str,
    startup_delay: bool,
    scope: &ApiTimeseriesScope,
    input: &ViewInput<ApiTimeseriesField>,
    ctx: &QueryContext<'_>,
) -> BuiltQuery<TimeseriesPayload> {
    let mut folded = fold_filters(&input.filters, ctx.diagnostics);
    let window = TimeWindow::resolve(
        &folded.time,
        ctx.now_ms,
        ctx.settings.historical_window_ms,
        ApiTimeseriesField::VIEW,
        ctx.diagnostics,
    );
    let refresh = RefreshPolicy::for_window(&window, ctx, startup_delay);
    let granularity = Granularity::for_window(&window);
    BuiltQuery {
        procedure,
        payload: TimeseriesPayload {
            api_id: scope.api_id.clone(),
            start_time: window.start_time,
            end_time: window.end_time,
            since: window.since,
            granularity,
            key_ids: folded.take(ApiTimeseriesField::KeyIds),
            names: folded.take(ApiTimeseriesField::Names),
            identities: folded.take(ApiTimeseriesField::Identities),
            outcomes: folded.take(ApiTimeseriesField::Outcomes),
            tags: folded.take(ApiTimeseriesField::Tags),
        },
        refresh,
    }
}

/// Verification outcome chart.
pub struct VerificationTimeseries;

impl QueryView for VerificationTimeseries {
    type Field = ApiTimeseriesField;
    type Payload = TimeseriesPayload;
    type Scope = ApiTimeseriesScope;

    const PROCEDURE: &'static str = "keys.timeseries";

    fn build(
        scope: &Self::Scope,
        input: &ViewInput<Self::Field>,
        ctx: &QueryContext<'_>,
    ) -> BuiltQuery<Self::Payload> {
        build_timeseries(Self::PROCEDURE, true, scope, input, ctx)
    }
}

/// Active keys chart.
pub struct ActiveKeysTimeseries;

impl QueryView for ActiveKeysTimeseries {
    type Field = ApiTimeseriesField;
    type Payload = TimeseriesPayload;
    type Scope = ApiTimeseriesScope;

    const PROCEDURE: &'static str = "keys.activeKeysTimeseries";

    fn build(
        scope: &Self::Scope,
        input: &ViewInput<Self::Field>,
        ctx: &QueryContext<'_>,
    ) -> BuiltQuery<Self::Payload> {
        build_timeseries(Self::PROCEDURE, false, scope, input, ctx)
    }
}
