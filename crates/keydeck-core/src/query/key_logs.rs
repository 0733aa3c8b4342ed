// crates/keydeck-core/src/query/key_logs.rs
// ============================================================================
// Module: Key Details Logs
// Description: Filter fields and payload builder for one key's verification log.
// Purpose: Turn the key details filter state into a `key.logs.query` request.
// Dependencies: crate::{core, filters, query}, serde
// ============================================================================

//! ## Overview
//! The key details table lists verifications for a single key. Its scope
//! carries the key and keyspace identifiers; filters narrow by tag, outcome
//! and time window.

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
use crate::query::overview_logs::outcome_metadata;
use crate::query::validate_conditions;
use crate::query::validate_limit;
use crate::query::validate_window;
use crate::query::window::TimeWindow;

/// Filterable fields of the key details log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyLogsField {
    /// Request tag.
    Tags,
    /// Verification outcome.
    Outcomes,
    /// Window start.
    StartTime,
    /// Window end.
    EndTime,
    /// Relative window.
    Since,
}

impl FilterField for KeyLogsField {
    const VIEW: &'static str = "key_details_logs";

    fn all() -> &'static [Self] {
        &[Self::Tags, Self::Outcomes, Self::StartTime, Self::EndTime, Self::Since]
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Outcomes => "outcomes",
            Self::StartTime => "startTime",
            Self::EndTime => "endTime",
            Self::Since => "since",
        }
    }

    fn config(self) -> FilterFieldConfig {
        match self {
            Self::Tags => FilterFieldConfig::text_array(),
            Self::Outcomes => FilterFieldConfig::enum_array(KEY_VERIFICATION_OUTCOMES),
            Self::StartTime | Self::EndTime => FilterFieldConfig::number_scalar(),
            Self::Since => FilterFieldConfig::text_scalar(),
        }
    }

    fn metadata_for(self, value: &FilterValue) -> Option<FilterMetadata> {
        outcome_metadata(self == Self::Outcomes, value)
    }
}

impl ViewField for KeyLogsField {
    fn role(self) -> FieldRole {
        match self {
            Self::StartTime => FieldRole::StartTime,
            Self::EndTime => FieldRole::EndTime,
            Self::Since => FieldRole::Since,
            Self::Tags | Self::Outcomes => FieldRole::Condition,
        }
    }
}

/// Identifiers a single-key view is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDetailsScope {
    /// Key being inspected.
    pub key_id: KeyId,
    /// Keyspace the key belongs to.
    pub keyspace_id: KeyspaceId,
}

/// Checks that both key identifiers are present.
pub(crate) fn validate_key_ids(
    key_id: &KeyId,
    keyspace_id: &KeyspaceId,
) -> Result<(), PayloadError> {
    if key_id.as_str().is_empty() {
        return Err(PayloadError::MissingId("keyId"));
    }
    if keyspace_id.as_str().is_empty() {
        return Err(PayloadError::MissingId("keyspaceId"));
    }
    Ok(())
}

/// `key.logs.query` request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLogsQueryPayload {
    /// Key being inspected.
    pub key_id: KeyId,
    /// Keyspace the key belongs to.
    pub keyspace_id: KeyspaceId,
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
    /// Tag conditions.
    pub tags: Vec<FilterCondition>,
    /// Outcome conditions.
    pub outcomes: Vec<FilterCondition>,
}

impl QueryPayload for KeyLogsQueryPayload {
    fn validate(&self) -> Result<(), PayloadError> {
        validate_key_ids(&self.key_id, &self.keyspace_id)?;
        validate_limit(self.limit)?;
        validate_window(self.start_time, self.end_time)?;
        validate_conditions("tags", &self.tags)?;
        validate_conditions("outcomes", &self.outcomes)
    }
}

/// Key details logs view.
pub struct KeyDetailsLogs;

impl QueryView for KeyDetailsLogs {
    type Field = KeyLogsField;
    type Payload = KeyLogsQueryPayload;
    type Scope = KeyDetailsScope;

    const PROCEDURE: &'static str = "key.logs.query";
    const SORT_COLUMNS: &'static [&'static str] = &["time"];

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
            KeyLogsField::VIEW,
            ctx.diagnostics,
        );
        let refresh = RefreshPolicy::for_window(&window, ctx, false);
        BuiltQuery {
            procedure: Self::PROCEDURE,
            payload: KeyLogsQueryPayload {
                key_id: scope.key_id.clone(),
                keyspace_id: scope.keyspace_id.clone(),
                limit: ctx.settings.page_limit,
                start_time: window.start_time,
                end_time: window.end_time,
                since: window.since,
                cursor: input.cursor,
                tags: folded.take(KeyLogsField::Tags),
                outcomes: folded.take(KeyLogsField::Outcomes),
            },
            refresh,
        }
    }
}
