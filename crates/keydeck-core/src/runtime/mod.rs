// crates/keydeck-core/src/runtime/mod.rs
// ============================================================================
// Module: Keydeck Runtime
// Description: Fetch, pagination, mutation, and polling helpers.
// Purpose: Drive query views and root key edits through the RPC boundary.
// Dependencies: crate::{interfaces, permissions, query}, tokio
// ============================================================================

//! ## Overview
//! Runtime helpers sit between the pure builders and [`crate::DashboardRpc`].
//! Everything here is synchronous except [`poller`], which owns a tokio task.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod loader;
pub mod mutations;
pub mod poller;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use loader::ChartView;
pub use loader::LogPager;
pub use loader::PagedView;
pub use loader::load_chart;
pub use mutations::RootKeyEditor;
pub use poller::PollEvent;
pub use poller::PollRequest;
pub use poller::Poller;
