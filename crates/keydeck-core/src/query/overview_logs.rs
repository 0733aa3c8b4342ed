// crates/keydeck-core/src/query/overview_logs.rs
// ============================================================================
// Module: Keys Overview Logs
// Description: Filter fields and payload builder for the per-API keys list.
// Purpose: Turn the keys overview filter state into a `keys.query` request.
// Dependencies: crate::{core, filters, query}, serde
// ============================================================================

//! ## Overview
//! The keys overview lists every key of one API with its recent verification
//! counts. Filters narrow by key identifier, name, identity, outcome and time
//! window; sort order comes from the `sorts` parameter.

use serde::Serialize;

use crate::core::ApiId;
use crate::core::KEY_VERIFICATION_OUTCOMES;
use crate::core::VerificationOutcome;
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
use crate::query::sort::SortSpec;
use crate::query::validate_conditions;
use crate::query::validate_limit;
use crate::query::validate_window;
use crate::query::window::TimeWindow;

/// Filterable fields of the keys overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OverviewLogsField {
    /// Key identifier.
    KeyIds,
    /// Key name.
    Names,
    /// Owning identity.
    Identities,
    /// Verification outcome.
    Outcomes,
    /// Window start.
    StartTime,
    /// Window end.
    EndTime,
    /// Relative window.
    Since,
}

impl FilterField for OverviewLogsField {
    const VIEW: &'static str = "keys_overview_logs";

    fn all() -> &'static [Self] {
        &[
            Self::KeyIds,
            Self::Names,
            Self::Identities,
            Self::Outcomes,
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
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Since => "since",
        }
    }

    fn config(self) -> FilterFieldConfig {
        match self {
            Self::KeyIds | Self::Names | Self::Identities => FilterFieldConfig::text_array(),
            Self::Outcomes => FilterFieldConfig::enum_array(KEY_VERIFICATION_OUTCOMES),
            Self::StartTime | Self::EndTime => FilterFieldConfig::number_scalar(),
            Self::Since => FilterFieldConfig::text_scalar(),
        }
    }

    fn metadata_for(self, value: &FilterValue) -> Option<FilterMetadata> {
        outcome_metadata(self == Self::Outcomes, value)
    }
}

impl ViewField for OverviewLogsField {
    fn role(self) -> FieldRole {
        match self {
            Self::StartTime => FieldRole::StartTime,
            Self::EndTime => FieldRole::EndTime,
            Self::Since => FieldRole::Since,
            Self::KeyIds | Self::Names | Self::Identities | Self::Outcomes => FieldRole::Condition,
        }
    }
}

/// Colour hint for outcome filter chips.
pub(crate) fn outcome_metadata(is_outcome: bool, value: &FilterValue) -> Option<FilterMetadata> {
    if !is_outcome {
        return None;
    }
    let FilterValue::Text(code) = value else {
        return None;
    };
    VerificationOutcome::parse(code).map(|outcome| FilterMetadata {
        color_class: outcome.color_class().to_string(),
    })
}

/// Identifiers the keys overview is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysOverviewScope {
    /// API whose keys are listed.
    pub api_id: ApiId,
}

/// `keys.query` request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysOverviewQueryPayload {
    /// API whose keys are listed.
    pub api_id: ApiId,
    /// Page size.
    pub limit: u32,
    /// Window start.
    pub start_time: i64,
    /// Window end.
    pub end_time: i64,
    /// Relative window, when it drove the bounds.
    pub since: Option<String>,
    /// Pagination cursor (timestamp of the last row).
    pub cursor: Option<i64>,
    /// Key id conditions.
    pub key_ids: Vec<FilterCondition>,
    /// Key name conditions.
    pub names: Vec<FilterCondition>,
    /// Identity conditions.
    pub identities: Vec<FilterCondition>,
    /// Outcome conditions.
    pub outcomes: Vec<FilterCondition>,
    /// Sort order.
    pub sorts: Vec<SortSpec>,
}

impl QueryPayload for KeysOverviewQueryPayload {
    fn validate(&self) -> Result<(), PayloadError> {
        if self.api_id.as_str().is_empty() {
            return Err(PayloadError::MissingId("apiId"));
        }
        validate_limit(self.limit)?;
        validate_window(self.start_time, self.end_time)?;
        validate_conditions("keyIds", &self.key_ids)?;
        validate_conditions("names", &self.names)?;
        validate_conditions("identities", &self.identities)?;
        validate_conditions("outcomes", &self.outcomes)
    }
}

/// Keys overview logs view.
pub struct KeysOverviewLogs;

impl QueryView for KeysOverviewLogs {
    type Field = OverviewLogsField;
    type Payload = KeysOverviewQueryPayload;
    type Scope = KeysOverviewScope;

    const PROCEDURE: &'static str = "keys.query";
    const SORT_COLUMNS: &'static [&'static str] = &["time", "valid", "invalid"];

    fn build(
        scope: &Self::Scope,
        input: &ViewInput<Self::Field>,
        ctx: &QueryContext<'_>,
    ) -> BuiltQuery<Self::Payload> {
        let mut folded = fold_filters(&input.filters, ctx.diagnostics);
        let window = TimeWindow::resolve(
            &folded.time,
            ctx.now_ms,
            ctx.settings.historical_window_ms,
            OverviewLogsField::VIEW,
            ctx.diagnostics,
        );
        let refresh = RefreshPolicy::for_window(&window, ctx, false);
        BuiltQuery {
            procedure: Self::PROCEDURE,
            payload: KeysOverviewQueryPayload {
                api_id: scope.api_id.clone(),
                limit: ctx.settings.page_limit,
                start_time: window.start_time,
                end_time: window.end_time,
                since: window.since,
                cursor: input.cursor,
                key_ids: folded.take(OverviewLogsField::KeyIds),
                names: folded.take(OverviewLogsField::Names),
                identities: folded.take(OverviewLogsField::Identities),
                outcomes: folded.take(OverviewLogsField::Outcomes),
                sorts: input.sorts.clone(),
            },
            refresh,
        }
    }
}
