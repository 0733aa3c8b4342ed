// crates/keydeck-core/src/lib.rs
// ============================================================================
// Module: Keydeck Core Library
// Description: Public API surface for the Keydeck dashboard logic.
// Purpose: Expose permission, filter, query, and rendering building blocks.
// Dependencies: crate::{core, permissions, filters, query, table, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Keydeck core holds the headless logic behind an API-key management
//! dashboard: root-key permission selection with tri-state checkbox
//! derivation, URL-backed filter state, per-view query payload builders,
//! verification outcome classification, and table render descriptors.
//! Transport, storage, and UI rendering stay outside this crate and are
//! reached through explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod diagnostics;
pub mod filters;
pub mod interfaces;
pub mod permissions;
pub mod query;
pub mod runtime;
pub mod table;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use diagnostics::DiagnosticEvent;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::DropReason;
pub use diagnostics::FileDiagnosticSink;
pub use diagnostics::MemoryDiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::StderrDiagnosticSink;
pub use filters::Filter;
pub use filters::FilterField;
pub use filters::FilterFieldConfig;
pub use filters::FilterId;
pub use filters::FilterOperator;
pub use filters::FilterState;
pub use filters::FilterValue;
pub use filters::MemoryQueryStore;
pub use filters::QueryParams;
pub use filters::QueryStateStore;
pub use filters::StoreError;
pub use filters::UrlQueryStore;
pub use interfaces::CreatedRootKey;
pub use interfaces::DashboardRpc;
pub use interfaces::KeyOverviewRow;
pub use interfaces::Notice;
pub use interfaces::Page;
pub use interfaces::QueryState;
pub use interfaces::RpcError;
pub use interfaces::TimeseriesPoint;
pub use interfaces::VerificationLogRow;
pub use permissions::CatalogScope;
pub use permissions::CheckedStates;
pub use permissions::PermissionCatalog;
pub use permissions::PermissionEntry;
pub use permissions::PermissionSelector;
pub use permissions::SearchTarget;
pub use permissions::SelectionCommand;
pub use permissions::SelectionState;
pub use query::BuiltQuery;
pub use query::QueryContext;
pub use query::QueryPayload;
pub use query::QuerySettings;
pub use query::QueryView;
pub use query::RawFilter;
pub use query::RefreshPolicy;
pub use query::TimeWindow;
pub use query::ViewInput;
pub use runtime::LogPager;
pub use runtime::PollRequest;
pub use runtime::Poller;
pub use runtime::RootKeyEditor;
pub use table::Cell;
pub use table::Column;
pub use table::ColumnKind;
pub use table::TableRenderer;
pub use table::TableRow;
