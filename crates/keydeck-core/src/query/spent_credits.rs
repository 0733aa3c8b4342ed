// crates/keydeck-core/src/query/spent_credits.rs
// ============================================================================
// Module: Spent Credits
// Description: Filter fields and payload builder for a key's credit spend chart.
// Purpose: Turn the spend chart filter state into a `key.spentCredits` request.
// Dependencies: crate::{core, filters, query}, serde
// ============================================================================

//! ## Overview
//! The spend chart sums credits consumed by one key per bucket. It shares the
//! key details scope and has no startup delay.

use serde::Serialize;

use crate::core::KEY_VERIFICATION_OUTCOMES;
use crate::core::KeyId;
use crate::core::KeyspaceId;
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
use crate::query::key_logs::KeyDetailsScope;
use crate::query::key_logs::validate_key_ids;
use crate::query::overview_logs::outcome_metadata;
use crate::query::validate_conditions;
use crate::query::validate_window;
use crate::query::window::TimeWindow;

/// Filterable fields of the spend chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpentCreditsField {
    /// Verification outcome.
    Outcomes,
    /// Window start.
    StartTime,
    /// Window end.
    EndTime,
    /// Relative window.
    Since,
}

impl FilterField for SpentCreditsField {
    const VIEW: &'static str = "key_spent_credits";

    fn all() -> &'static [Self] {
        &[Self::Outcomes, Self::StartTime, Self::EndTime, Self::Since]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Outcomes => "outcomes",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Since => "since",
        }
    }

    fn config(self) -> FilterFieldConfig {
        match self {
            Self::Outcomes => FilterFieldConfig::enum_array(KEY_VERIFICATION_OUTCOMES),
            Self::StartTime | Self::EndTime => FilterFieldConfig::number_scalar(),
            Self::Since => FilterFieldConfig::text_scalar(),
        }
    }

    fn metadata_for(self, value: &FilterValue) -> Option<FilterMetadata> {
        outcome_metadata(self == Self::Outcomes, value)
    }
}

impl ViewField for SpentCreditsField {
    fn role(self) -> FieldRole {
        match self {
            Self::Outcomes => FieldRole::Condition,
            Self::StartTime => FieldRole::StartTime,
            Self::EndTime => FieldRole::EndTime,
            Self::Since => FieldRole::Since,
        }
    }
}

/// `key.spentCredits` request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpentCreditsPayload {
    /// Key being inspected.
    pub key_id: KeyId,
    /// Keyspace the key belongs to.
    pub keyspace_id: KeyspaceId,
    /// Window start.
    pub start_time: i64,
    /// Window end.
    pub end_time: i64,
    /// Relative window, when it drove the bounds.
    pub since: Option<String>,
    /// Bucket size.
    pub granularity: Granularity,
    /// Outcome conditions.
    pub outcomes: Vec<FilterCondition>,
}

impl QueryPayload for SpentCreditsPayload {
    fn validate(&self) -> Result<(), PayloadError> {
        validate_key_ids(&self.key_id, &self.keyspace_id)?;
        validate_window(self.start_time, self.end_time)?;
        validate_conditions("outcomes", &self.outcomes)
    }
}

/// Credit spend chart for one key.
pub struct SpentCredits;

impl QueryView for SpentCredits {
    type Field = SpentCreditsField;
    type Payload = SpentCreditsPayload;
    type Scope = KeyDetailsScope;

    const PROCEDURE: &'static str = "key.spentCredits";

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
            SpentCreditsField::VIEW,
            ctx.diagnostics,
        );
        let refresh = RefreshPolicy::for_window(&window, ctx, false);
        let granularity = Granularity::for_window(&window);
        BuiltQuery {
            procedure: Self::PROCEDURE,
            payload: SpentCreditsPayload {
                key_id: scope.key_id.clone(),
                keyspace_id: scope.keyspace_id.clone(),
                start_time: window.start_time,
                end_time: window.end_time,
                since: window.since,
                granularity,
                outcomes: folded.take(SpentCreditsField::Outcomes),
            },
            refresh,
        }
    }
}
