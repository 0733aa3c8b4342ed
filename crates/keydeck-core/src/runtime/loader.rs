// crates/keydeck-core/src/runtime/loader.rs
// ============================================================================
// Module: View Loaders
// Description: Fetch helpers tying query views to RPC procedures.
// Purpose: Build, validate, and send view payloads; follow log cursors.
// Dependencies: crate::{core, interfaces, query}
// ============================================================================

//! ## Overview
//! [`PagedView`] and [`ChartView`] bind each view to its procedure on
//! [`DashboardRpc`]. Payloads are validated before sending; a payload that
//! fails validation is reported as [`QueryState::Failed`] without a call.
//! [`LogPager`] accumulates log pages by following `next_cursor`.

use crate::core::OutcomeCounts;
use crate::interfaces::DashboardRpc;
use crate::interfaces::KeyOverviewRow;
use crate::interfaces::Page;
use crate::interfaces::QueryState;
use crate::interfaces::RpcError;
use crate::interfaces::TimeseriesPoint;
use crate::interfaces::VerificationLogRow;
use crate::query::ActiveKeysTimeseries;
use crate::query::KeyDetailsLogs;
use crate::query::KeysOverviewLogs;
use crate::query::QueryContext;
use crate::query::QueryPayload;
use crate::query::QueryView;
use crate::query::SpentCredits;
use crate::query::VerificationTimeseries;
use crate::query::ViewInput;

// ============================================================================
// SECTION: View Bindings
// ============================================================================

/// Cursor-paginated log view.
pub trait PagedView: QueryView {
    /// Row type.
    type Row;

    /// Calls the view's procedure.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Page<Self::Row>, RpcError>;
}

impl PagedView for KeysOverviewLogs {
    type Row = KeyOverviewRow;

    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Page<Self::Row>, RpcError> {
        rpc.query_keys_overview(payload)
    }
}

impl PagedView for KeyDetailsLogs {
    type Row = VerificationLogRow;

    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Page<Self::Row>, RpcError> {
        rpc.query_key_logs(payload)
    }
}

/// Chart view returning one point per bucket.
pub trait ChartView: QueryView {
    /// Bucket value.
    type Value;

    /// Calls the view's procedure.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Vec<TimeseriesPoint<Self::Value>>, RpcError>;
}

impl ChartView for VerificationTimeseries {
    type Value = OutcomeCounts;

    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Vec<TimeseriesPoint<Self::Value>>, RpcError> {
        rpc.verification_timeseries(payload)
    }
}

impl ChartView for ActiveKeysTimeseries {
    type Value = u64;

    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Vec<TimeseriesPoint<Self::Value>>, RpcError> {
        rpc.active_keys_timeseries(payload)
    }
}

impl ChartView for SpentCredits {
    type Value = u64;

    fn fetch<R: DashboardRpc + ?Sized>(
        rpc: &R,
        payload: &Self::Payload,
    ) -> Result<Vec<TimeseriesPoint<Self::Value>>, RpcError> {
        rpc.spent_credits_timeseries(payload)
    }
}

/// Builds, validates, and fetches one chart.
#[must_use]
pub fn load_chart<V: ChartView, R: DashboardRpc + ?Sized>(
    rpc: &R,
    scope: &V::Scope,
    input: &ViewInput<V::Field>,
    ctx: &QueryContext<'_>,
) -> QueryState<Vec<TimeseriesPoint<V::Value>>> {
    let built = V::build(scope, input, ctx);
    if let Err(err) = built.payload.validate() {
        return QueryState::Failed(err.to_string());
    }
    QueryState::from_result(V::fetch(rpc, &built.payload))
}

// ============================================================================
// SECTION: Log Pager
// ============================================================================

/// Accumulated rows of a paged log view.
pub struct LogPager<V: PagedView> {
    /// Rows loaded so far, in page order.
    rows: Vec<V::Row>,
    /// Cursor for the next page.
    next_cursor: Option<i64>,
    /// True while more pages exist.
    has_more: bool,
}

impl<V: PagedView> Default for LogPager<V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_cursor: None,
            has_more: true,
        }
    }
}

impl<V: PagedView> LogPager<V> {
    /// Creates an empty pager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows loaded so far.
    #[must_use]
    pub fn rows(&self) -> &[V::Row] {
        &self.rows
    }

    /// Returns true while more pages exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor for the next page.
    #[must_use]
    pub const fn next_cursor(&self) -> Option<i64> {
        self.next_cursor
    }

    /// Drops loaded rows and loads the first page.
    ///
    /// Returns the number of rows loaded.
    pub fn reload<R: DashboardRpc + ?Sized>(
        &mut self,
        rpc: &R,
        scope: &V::Scope,
        input: &ViewInput<V::Field>,
        ctx: &QueryContext<'_>,
    ) -> QueryState<usize> {
        *self = Self::new();
        self.fetch_page(rpc, scope, input, None, ctx)
    }

    /// Loads the page after the last one; a no-op once exhausted.
    ///
    /// Returns the number of rows added.
    pub fn load_more<R: DashboardRpc + ?Sized>(
        &mut self,
        rpc: &R,
        scope: &V::Scope,
        input: &ViewInput<V::Field>,
        ctx: &QueryContext<'_>,
    ) -> QueryState<usize> {
        if !self.has_more {
            return QueryState::Ready(0);
        }
        let cursor = self.next_cursor;
        self.fetch_page(rpc, scope, input, cursor, ctx)
    }

    /// Fetches one page at `cursor` and appends it.
    fn fetch_page<R: DashboardRpc + ?Sized>(
        &mut self,
        rpc: &R,
        scope: &V::Scope,
        input: &ViewInput<V::Field>,
        cursor: Option<i64>,
        ctx: &QueryContext<'_>,
    ) -> QueryState<usize> {
        let input = ViewInput {
            filters: input.filters.clone(),
            sorts: input.sorts.clone(),
            cursor,
        };
        let built = V::build(scope, &input, ctx);
        if let Err(err) = built.payload.validate() {
            return QueryState::Failed(err.to_string());
        }
        match V::fetch(rpc, &built.payload) {
            Ok(page) => {
                let added = page.items.len();
                self.rows.extend(page.items);
                self.has_more = page.has_more && page.next_cursor.is_some();
                self.next_cursor = page.next_cursor;
                QueryState::Ready(added)
            }
            Err(err) => QueryState::Failed(err.to_string()),
        }
    }
}
