// crates/keydeck-core/src/filters/mod.rs
// ============================================================================
// Module: Filters
// Description: Typed filters backed by URL-style query state.
// Purpose: Keep the filter list and the query string in lockstep.
// Dependencies: crate::filters::{codec, model, store, sync}
// ============================================================================

//! ## Overview
//! Filters are declared per view, stored in a flat string map, and derived
//! back into typed lists on every read.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod codec;
pub mod model;
pub mod store;
pub mod sync;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use model::EXACT_OPERATORS;
pub use model::Filter;
pub use model::FilterField;
pub use model::FilterFieldConfig;
pub use model::FilterId;
pub use model::FilterMetadata;
pub use model::FilterOperator;
pub use model::FilterValue;
pub use model::ParamSlot;
pub use model::TEXT_OPERATORS;
pub use model::ValueKind;
pub use store::MemoryQueryStore;
pub use store::QueryParams;
pub use store::QueryStateStore;
pub use store::StoreError;
pub use store::UrlQueryStore;
pub use sync::FilterState;
pub use sync::decode_filters;
pub use sync::encode_filters;
