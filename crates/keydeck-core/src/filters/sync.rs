// crates/keydeck-core/src/filters/sync.rs
// ============================================================================
// Module: Filter State Synchronization
// Description: Two-way binding between query state and typed filter lists.
// Purpose: Derive filters from the store and write updates back atomically.
// Dependencies: crate::diagnostics, crate::filters::{codec, model, store}, crate::query::sort
// ============================================================================

//! ## Overview
//! The store is the only source of truth. Reading re-derives an ordered list
//! (field declaration order, then stored order) with fresh ids. Writing
//! partitions the list by field, re-serializes every managed slot, clears
//! slots left empty, keeps unrelated parameters, and performs one replace.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::diagnostics::DiagnosticEvent;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::DropReason;
use crate::diagnostics::NoopDiagnosticSink;
use crate::filters::codec::ItemError;
use crate::filters::codec::decode_array;
use crate::filters::codec::encode_array;
use crate::filters::model::Filter;
use crate::filters::model::FilterField;
use crate::filters::model::FilterId;
use crate::filters::model::FilterOperator;
use crate::filters::model::FilterValue;
use crate::filters::model::ParamSlot;
use crate::filters::store::QueryParams;
use crate::filters::store::QueryStateStore;
use crate::filters::store::StoreError;
use crate::query::sort::SortSpec;
use crate::query::sort::read_sorts;
use crate::query::sort::write_sorts;

// ============================================================================
// SECTION: Filter State
// ============================================================================

/// Filter list bound to a query state store.
pub struct FilterState<F, S> {
    /// Backing store.
    store: S,
    /// Sink for dropped or coerced values.
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Field enum marker.
    fields: PhantomData<F>,
}

impl<F: FilterField, S: QueryStateStore> FilterState<F, S> {
    /// Binds to `store`, discarding diagnostics.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_diagnostics(store, Arc::new(NoopDiagnosticSink))
    }

    /// Binds to `store`, reporting diagnostics to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(store: S, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            store,
            diagnostics,
            fields: PhantomData,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Derives the current filter list.
    #[must_use]
    pub fn filters(&self) -> Vec<Filter<F>> {
        decode_filters(&self.store.snapshot(), self.diagnostics.as_ref())
    }

    /// Writes `filters` back as the complete filter set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the write.
    pub fn update_filters(&mut self, filters: &[Filter<F>]) -> Result<(), StoreError> {
        let mut params = self.store.snapshot();
        encode_filters(&mut params, filters, self.diagnostics.as_ref());
        self.store.replace(params)
    }

    /// Removes the filter with `id` from `current` and writes the rest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the write.
    pub fn remove_filter(&mut self, current: &[Filter<F>], id: FilterId) -> Result<(), StoreError> {
        let remaining: Vec<Filter<F>> =
            current.iter().filter(|filter| filter.id != id).cloned().collect();
        self.update_filters(&remaining)
    }

    /// Removes every filter managed by this view.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the write.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.update_filters(&[])
    }

    /// Derives the current sort order, keeping only `columns`.
    #[must_use]
    pub fn sorts(&self, columns: &[&str]) -> Vec<SortSpec> {
        read_sorts(&self.store.snapshot(), columns, F::VIEW, self.diagnostics.as_ref())
    }

    /// Writes `sorts` as the complete sort order; filters are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the write.
    pub fn update_sorts(&mut self, sorts: &[SortSpec]) -> Result<(), StoreError> {
        let mut params = self.store.snapshot();
        write_sorts(&mut params, sorts);
        self.store.replace(params)
    }
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Expands query params into an ordered filter list.
#[must_use]
pub fn decode_filters<F: FilterField>(
    params: &QueryParams,
    diagnostics: &dyn DiagnosticSink,
) -> Vec<Filter<F>> {
    let mut filters = Vec::new();
    for field in F::all().iter().copied() {
        let Some(raw) = params.get(field.as_str()) else {
            continue;
        };
        let config = field.config();
        match config.slot {
            ParamSlot::Array => {
                for item in decode_array(raw) {
                    match item {
                        Ok((operator, value)) => {
                            if let Some(filter) =
                                admit(field, operator, &FilterValue::Text(value), diagnostics)
                            {
                                filters.push(filter);
                            }
                        }
                        Err(ItemError::Malformed(item)) => {
                            report(diagnostics, field, DropReason::MalformedParam, item);
                        }
                        Err(ItemError::UnknownOperator(token)) => {
                            report(diagnostics, field, DropReason::UnknownOperator, token);
                        }
                    }
                }
            }
            ParamSlot::Scalar => {
                if raw.is_empty() {
                    continue;
                }
                let operator = config.fallback_operator();
                if let Some(filter) =
                    admit(field, operator, &FilterValue::Text(raw.to_string()), diagnostics)
                {
                    filters.push(filter);
                }
            }
        }
    }
    filters
}

/// Validates one decoded value and builds the filter.
fn admit<F: FilterField>(
    field: F,
    operator: FilterOperator,
    value: &FilterValue,
    diagnostics: &dyn DiagnosticSink,
) -> Option<Filter<F>> {
    let config = field.config();
    let value = match config.accept_value(value) {
        Ok(value) => value,
        Err(reason) => {
            report(diagnostics, field, reason, value.to_param_string());
            return None;
        }
    };
    let (operator, coerced) = config.resolve_operator(operator);
    if coerced {
        report(diagnostics, field, DropReason::OperatorFallback, value.to_param_string());
    }
    Some(Filter::new(field, operator, value))
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Re-serializes every managed slot of `params` from `filters`.
pub fn encode_filters<F: FilterField>(
    params: &mut QueryParams,
    filters: &[Filter<F>],
    diagnostics: &dyn DiagnosticSink,
) {
    let mut by_field: BTreeMap<F, Vec<&Filter<F>>> = BTreeMap::new();
    for filter in filters {
        by_field.entry(filter.field).or_default().push(filter);
    }
    for field in F::all().iter().copied() {
        let config = field.config();
        let mut accepted = Vec::new();
        for filter in by_field.get(&field).map(Vec::as_slice).unwrap_or_default() {
            match config.accept_value(&filter.value) {
                Ok(value) => {
                    let (operator, coerced) = config.resolve_operator(filter.operator);
                    if coerced {
                        report(
                            diagnostics,
                            field,
                            DropReason::OperatorFallback,
                            value.to_param_string(),
                        );
                    }
                    accepted.push((operator, value.to_param_string()));
                }
                Err(reason) => {
                    report(diagnostics, field, reason, filter.value.to_param_string());
                }
            }
        }
        let encoded = match config.slot {
            ParamSlot::Array => (!accepted.is_empty()).then(|| encode_array(&accepted)),
            ParamSlot::Scalar => accepted.pop().map(|(_, value)| value),
        };
        match encoded {
            Some(value) => params.set(field.as_str(), value),
            None => {
                params.remove(field.as_str());
            }
        }
    }
}

/// Records a diagnostic for `field`.
fn report<F: FilterField>(
    diagnostics: &dyn DiagnosticSink,
    field: F,
    reason: DropReason,
    value: String,
) {
    diagnostics.record(&DiagnosticEvent::new(F::VIEW, field.as_str(), reason, Some(value)));
}
