//! Query payload builder tests.
//!
//! ## Purpose
//! Each view folds its filters into a backend payload plus a refresh policy.
//! These tests pin the window defaults, the coercion policy, and the wire
//! shape of the payloads.
//!
//! ## What is covered
//! - Default and relative windows, and live versus historical polling.
//! - Invalid values and operators reported instead of sent.
//! - Untyped filters resolved against view fields.
//! - Payload validation against backend input limits.
//! - Building directly from query parameters, including sorts.
// crates/keydeck-core/tests/query_builders.rs
// ============================================================================
// Module: Query Builder Tests
// Description: Window, coercion, and validation checks for view payloads.
// Purpose: Ensure filter state maps to the payloads the backend expects.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use keydeck_core::ApiId;
use keydeck_core::DropReason;
use keydeck_core::Filter;
use keydeck_core::FilterOperator;
use keydeck_core::FilterValue;
use keydeck_core::KeyId;
use keydeck_core::KeyspaceId;
use keydeck_core::MemoryDiagnosticSink;
use keydeck_core::QueryContext;
use keydeck_core::QueryParams;
use keydeck_core::QueryPayload;
use keydeck_core::QuerySettings;
use keydeck_core::QueryView;
use keydeck_core::RawFilter;
use keydeck_core::ViewInput;
use keydeck_core::query::ActiveKeysTimeseries;
use keydeck_core::query::ApiTimeseriesField;
use keydeck_core::query::ApiTimeseriesScope;
use keydeck_core::query::Granularity;
use keydeck_core::query::HISTORICAL_DATA_WINDOW_MS;
use keydeck_core::query::KeyDetailsLogs;
use keydeck_core::query::KeyDetailsScope;
use keydeck_core::query::KeyLogsField;
use keydeck_core::query::KeysOverviewLogs;
use keydeck_core::query::KeysOverviewScope;
use keydeck_core::query::OverviewLogsField;
use keydeck_core::query::PayloadError;
use keydeck_core::query::SortDirection;
use keydeck_core::query::SortSpec;
use keydeck_core::query::SpentCredits;
use keydeck_core::query::SpentCreditsField;
use keydeck_core::query::VerificationTimeseries;
use keydeck_core::query::resolve_raw_filters;
use serde_json::json;

mod support;
use crate::support::TestResult;
use crate::support::ensure;

/// Fixed "now" for every test.
const NOW: i64 = 1_700_000_000_000;
/// One hour in milliseconds.
const HOUR: i64 = 3_600_000;

fn overview_scope() -> KeysOverviewScope {
    KeysOverviewScope {
        api_id: ApiId::new("api_123"),
    }
}

fn key_scope() -> KeyDetailsScope {
    KeyDetailsScope {
        key_id: KeyId::new("key_1"),
        keyspace_id: KeyspaceId::new("ks_1"),
    }
}

fn chart_scope() -> ApiTimeseriesScope {
    ApiTimeseriesScope {
        api_id: ApiId::new("api_123"),
    }
}

fn input<F>(filters: Vec<Filter<F>>) -> ViewInput<F> {
    ViewInput {
        filters,
        ..ViewInput::default()
    }
}

// ============================================================================
// SECTION: Windows and Refresh
// ============================================================================

#[test]
fn empty_filters_use_trailing_historical_window() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(&overview_scope(), &ViewInput::default(), &ctx);

    ensure(built.procedure == "keys.query", "procedure")?;
    ensure(built.payload.end_time == NOW, "end defaults to now")?;
    ensure(built.payload.start_time == NOW - HISTORICAL_DATA_WINDOW_MS, "start is 12h back")?;
    ensure(built.payload.since.is_none(), "no relative window")?;
    ensure(built.payload.limit == 50, "default page size")?;
    ensure(built.refresh.is_live(), "window ending now is live")?;
    ensure(built.refresh.refetch_interval_ms == Some(10_000), "live interval")?;
    ensure(built.refresh.startup_delay_ms.is_none(), "logs start immediately")?;
    ensure(sink.events().is_empty(), "nothing to report")?;
    built.payload.validate()?;
    Ok(())
}

#[test]
fn since_overrides_explicit_bounds() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeyDetailsLogs::build(
        &key_scope(),
        &input(vec![
            Filter::new(KeyLogsField::StartTime, FilterOperator::Is, 5_i64),
            Filter::new(KeyLogsField::EndTime, FilterOperator::Is, 10_i64),
            Filter::new(KeyLogsField::Since, FilterOperator::Is, "24h"),
        ]),
        &ctx,
    );
    ensure(built.payload.start_time == NOW - 24 * HOUR, "since drives the start")?;
    ensure(built.payload.end_time == NOW, "since ends now")?;
    ensure(built.payload.since.as_deref() == Some("24h"), "since is echoed")?;
    ensure(built.refresh.is_live(), "relative windows are live")?;
    Ok(())
}

#[test]
fn past_window_is_not_polled() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(
        &overview_scope(),
        &input(vec![
            Filter::new(OverviewLogsField::StartTime, FilterOperator::Is, NOW - 48 * HOUR),
            Filter::new(OverviewLogsField::EndTime, FilterOperator::Is, NOW - 24 * HOUR),
        ]),
        &ctx,
    );
    ensure(built.payload.start_time == NOW - 48 * HOUR, "explicit start")?;
    ensure(built.payload.end_time == NOW - 24 * HOUR, "explicit end")?;
    ensure(!built.refresh.is_live(), "historical windows do not poll")?;
    Ok(())
}

#[test]
fn invalid_since_falls_back_and_is_reported() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = SpentCredits::build(
        &key_scope(),
        &input(vec![Filter::new(SpentCreditsField::Since, FilterOperator::Is, "forever")]),
        &ctx,
    );
    ensure(built.payload.since.is_none(), "unparsed since is not sent")?;
    ensure(built.payload.start_time == NOW - HISTORICAL_DATA_WINDOW_MS, "default window")?;
    ensure(sink.reasons() == vec![DropReason::InvalidDuration], "bad duration reported")?;
    Ok(())
}

#[test]
fn verification_chart_waits_before_first_fetch() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let verification = VerificationTimeseries::build(&chart_scope(), &ViewInput::default(), &ctx);
    let active = ActiveKeysTimeseries::build(&chart_scope(), &ViewInput::default(), &ctx);

    ensure(verification.procedure == "keys.timeseries", "verification procedure")?;
    ensure(active.procedure == "keys.activeKeysTimeseries", "active keys procedure")?;
    ensure(verification.refresh.startup_delay_ms == Some(1_000), "verification delay")?;
    ensure(active.refresh.startup_delay_ms.is_none(), "active keys start immediately")?;
    ensure(verification.payload.granularity == Granularity::Per15Minutes, "12h buckets")?;
    ensure(verification.payload == active.payload, "both charts share one payload shape")?;
    Ok(())
}

#[test]
fn disabled_startup_delay_is_omitted() -> TestResult {
    let settings = QuerySettings {
        timeseries_startup_delay_ms: 0,
        ..QuerySettings::default()
    };
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = VerificationTimeseries::build(&chart_scope(), &ViewInput::default(), &ctx);
    ensure(built.refresh.startup_delay_ms.is_none(), "zero delay means none")?;
    Ok(())
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

#[test]
fn unknown_outcome_is_dropped_from_payload() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(
        &overview_scope(),
        &input(vec![Filter::new(OverviewLogsField::Outcomes, FilterOperator::Is, "NOT_REAL")]),
        &ctx,
    );
    ensure(built.payload.outcomes.is_empty(), "unknown outcome is not sent")?;
    ensure(sink.reasons() == vec![DropReason::NotAllowed], "drop is reported")?;
    let event = &sink.events()[0];
    ensure(event.field == "outcomes", "event names the field")?;
    ensure(event.value.as_deref() == Some("NOT_REAL"), "event carries the value")?;
    Ok(())
}

#[test]
fn disallowed_operator_falls_back_to_first_allowed() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeyDetailsLogs::build(
        &key_scope(),
        &input(vec![
            Filter::new(KeyLogsField::Outcomes, FilterOperator::StartsWith, "VALID"),
            Filter::new(KeyLogsField::Tags, FilterOperator::Contains, "env:prod"),
        ]),
        &ctx,
    );
    ensure(built.payload.outcomes.len() == 1, "coerced outcome is kept")?;
    ensure(built.payload.outcomes[0].operator == FilterOperator::Is, "operator coerced")?;
    ensure(built.payload.tags[0].operator == FilterOperator::Contains, "tag operator kept")?;
    ensure(sink.reasons() == vec![DropReason::OperatorFallback], "coercion reported")?;
    Ok(())
}

#[test]
fn non_numeric_time_bound_is_dropped() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(
        &overview_scope(),
        &input(vec![Filter::new(OverviewLogsField::StartTime, FilterOperator::Is, "noon")]),
        &ctx,
    );
    ensure(built.payload.start_time == NOW - HISTORICAL_DATA_WINDOW_MS, "default start")?;
    ensure(sink.reasons() == vec![DropReason::NotNumeric], "bad bound reported")?;
    Ok(())
}

#[test]
fn raw_filters_resolve_against_view_fields() -> TestResult {
    let sink = MemoryDiagnosticSink::new();
    let raw = vec![
        RawFilter {
            field: "names".to_string(),
            operator: "contains".to_string(),
            value: FilterValue::from("prod"),
        },
        RawFilter {
            field: "color".to_string(),
            operator: "is".to_string(),
            value: FilterValue::from("red"),
        },
        RawFilter {
            field: "tags".to_string(),
            operator: "like".to_string(),
            value: FilterValue::from("team:core"),
        },
    ];
    let filters = resolve_raw_filters::<ApiTimeseriesField>(&raw, &sink);
    ensure(filters.len() == 2, "unknown field dropped")?;
    ensure(filters[0].field == ApiTimeseriesField::Names, "names kept")?;
    ensure(filters[0].operator == FilterOperator::Contains, "names operator kept")?;
    ensure(filters[1].field == ApiTimeseriesField::Tags, "tags kept")?;
    ensure(filters[1].operator == FilterOperator::Is, "unknown operator falls back")?;
    ensure(
        sink.reasons() == vec![DropReason::UnknownField, DropReason::OperatorFallback],
        "both reported",
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Params and Wire Shape
// ============================================================================

#[test]
fn build_from_params_reads_filters_and_sorts() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let params =
        QueryParams::parse("identities=startsWith%3Aorg_&since=1h&sorts=valid:desc,colour:asc");
    let built = KeysOverviewLogs::build_from_params(&overview_scope(), &params, Some(42), &ctx);

    ensure(built.payload.identities.len() == 1, "identity condition decoded")?;
    ensure(built.payload.start_time == NOW - HOUR, "since decoded")?;
    ensure(built.payload.cursor == Some(42), "cursor passed through")?;
    ensure(
        built.payload.sorts == vec![SortSpec::new("valid", SortDirection::Desc)],
        "known sort kept",
    )?;
    ensure(sink.reasons() == vec![DropReason::InvalidSort], "unknown sort column reported")?;
    Ok(())
}

#[test]
fn overview_payload_serializes_in_camel_case() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(
        &overview_scope(),
        &input(vec![Filter::new(OverviewLogsField::KeyIds, FilterOperator::Is, "key_9")]),
        &ctx,
    );
    let value = serde_json::to_value(&built.payload)?;
    ensure(value["apiId"] == json!("api_123"), "apiId")?;
    ensure(value["startTime"] == json!(NOW - HISTORICAL_DATA_WINDOW_MS), "startTime")?;
    ensure(value["keyIds"] == json!([{"operator": "is", "value": "key_9"}]), "keyIds")?;
    ensure(value["outcomes"] == json!([]), "empty outcomes")?;
    Ok(())
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn oversized_page_limit_fails_validation() -> TestResult {
    let settings = QuerySettings {
        page_limit: 500,
        ..QuerySettings::default()
    };
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = KeysOverviewLogs::build(&overview_scope(), &ViewInput::default(), &ctx);
    let err = built.payload.validate().err();
    ensure(
        err == Some(PayloadError::Limit {
            max: 100,
            actual: 500,
        }),
        "limit above 100 rejected",
    )?;
    Ok(())
}

#[test]
fn inverted_window_and_missing_ids_fail_validation() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let inverted = KeyDetailsLogs::build(
        &key_scope(),
        &input(vec![
            Filter::new(KeyLogsField::StartTime, FilterOperator::Is, NOW),
            Filter::new(KeyLogsField::EndTime, FilterOperator::Is, NOW - HOUR),
        ]),
        &ctx,
    );
    ensure(
        matches!(inverted.payload.validate(), Err(PayloadError::TimeWindow { .. })),
        "start after end rejected",
    )?;

    let missing = KeyDetailsScope {
        key_id: KeyId::new(""),
        keyspace_id: KeyspaceId::new("ks_1"),
    };
    let built = KeyDetailsLogs::build(&missing, &ViewInput::default(), &ctx);
    ensure(
        built.payload.validate() == Err(PayloadError::MissingId("keyId")),
        "empty key id rejected",
    )?;
    Ok(())
}

#[test]
fn overlong_condition_value_fails_validation() -> TestResult {
    let settings = QuerySettings::default();
    let sink = MemoryDiagnosticSink::new();
    let ctx = QueryContext {
        now_ms: NOW,
        settings: &settings,
        diagnostics: &sink,
    };
    let built = VerificationTimeseries::build(
        &chart_scope(),
        &input(vec![Filter::new(ApiTimeseriesField::Names, FilterOperator::Is, "n".repeat(300))]),
        &ctx,
    );
    ensure(
        built.payload.validate()
            == Err(PayloadError::ConditionValue {
                field: "names",
            }),
        "values over 256 characters rejected",
    )?;
    Ok(())
}
