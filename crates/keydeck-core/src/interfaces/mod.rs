// crates/keydeck-core/src/interfaces/mod.rs
// ============================================================================
// Module: Keydeck Interfaces
// Description: Transport-agnostic RPC boundary and its result shapes.
// Purpose: Define what the dashboard logic needs from the backend.
// Dependencies: crate::{core, permissions, query}, serde, thiserror
// ============================================================================

//! ## Overview
//! [`DashboardRpc`] is the only way the dashboard logic reaches the backend.
//! Inputs are the payloads built by [`crate::query`] and the validated
//! mutation requests from [`crate::permissions`]. Implementations own the
//! transport, caching, and request de-duplication.
//!
//! Read failures become [`QueryState::Failed`]; mutation failures become a
//! [`Notice`] carrying the server message. Neither is retried here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::KeyId;
use crate::core::OutcomeCounts;
use crate::core::RootKeyId;
use crate::permissions::CreateRootKeyRequest;
use crate::permissions::UpdateRootKeyPermissionsRequest;
use crate::query::KeyLogsQueryPayload;
use crate::query::KeysOverviewQueryPayload;
use crate::query::SpentCreditsPayload;
use crate::query::TimeseriesPayload;

// ============================================================================
// SECTION: Procedures
// ============================================================================

/// Procedure that creates a root key.
pub const ROOT_KEY_CREATE: &str = "rootKey.create";
/// Procedure that replaces a root key's permissions.
pub const ROOT_KEY_UPDATE_PERMISSIONS: &str = "rootKey.update.permissions";

// ============================================================================
// SECTION: Result Shapes
// ============================================================================

/// One page of a cursor-paginated result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// True when more rows exist.
    pub has_more: bool,
    /// Cursor for the next page.
    pub next_cursor: Option<i64>,
}

impl<T> Page<T> {
    /// Returns a final page holding `items`.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_more: false,
            next_cursor: None,
        }
    }
}

/// Row of the keys overview table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyOverviewRow {
    /// Key identifier.
    pub key_id: KeyId,
    /// Optional key name.
    pub name: Option<String>,
    /// Optional owning identity.
    pub identity: Option<String>,
    /// Last verification time (ms since epoch).
    pub last_used: Option<i64>,
    /// Verification outcome counts in the window.
    pub counts: OutcomeCounts,
    /// Tags seen on the key's requests.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Row of a verification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationLogRow {
    /// Request identifier.
    pub request_id: String,
    /// Verification time (ms since epoch).
    pub time: i64,
    /// Outcome code as reported by the backend.
    pub outcome: String,
    /// Region that served the request.
    pub region: String,
    /// Request tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesPoint<Y> {
    /// Bucket start (ms since epoch).
    pub x: i64,
    /// Bucket value.
    pub y: Y,
}

/// Result of creating a root key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRootKey {
    /// New root key identifier.
    pub key_id: RootKeyId,
    /// Plaintext key, shown once.
    pub key: String,
}

// ============================================================================
// SECTION: Errors and States
// ============================================================================

/// RPC boundary errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Backend rejected the call.
    #[error("{code}: {message}")]
    Server {
        /// Backend error code.
        code: String,
        /// Backend-provided message.
        message: String,
    },
    /// Transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response could not be decoded.
    #[error("invalid response: {0}")]
    Invalid(String),
}

impl RpcError {
    /// Returns the message to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                message, ..
            } => message.clone(),
            Self::Transport(_) | Self::Invalid(_) => self.to_string(),
        }
    }
}

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Error,
}

/// Transient user notice; the headless analogue of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Short title.
    pub title: String,
    /// Detail message.
    pub message: String,
}

impl Notice {
    /// Builds an error notice.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Builds a success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Builds an error notice from a failed mutation, keeping the server message.
    #[must_use]
    pub fn from_mutation_error(title: impl Into<String>, error: &RpcError) -> Self {
        Self::error(title, error.user_message())
    }
}

/// State of one read query as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum QueryState<T> {
    /// Latest result.
    Ready(T),
    /// Latest fetch failed; the view shows an error placeholder.
    Failed(String),
}

impl<T> QueryState<T> {
    /// Converts a fetch result.
    #[must_use]
    pub fn from_result(result: Result<T, RpcError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    /// Returns the ready value.
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Returns true when the latest fetch failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

// ============================================================================
// SECTION: RPC Trait
// ============================================================================

/// Typed backend procedures used by the dashboard.
pub trait DashboardRpc {
    /// `keys.query`: one page of the per-API keys overview.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn query_keys_overview(
        &self,
        payload: &KeysOverviewQueryPayload,
    ) -> Result<Page<KeyOverviewRow>, RpcError>;

    /// `key.logs.query`: one page of a key's verification log.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn query_key_logs(
        &self,
        payload: &KeyLogsQueryPayload,
    ) -> Result<Page<VerificationLogRow>, RpcError>;

    /// `keys.timeseries`: verification outcomes per bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn verification_timeseries(
        &self,
        payload: &TimeseriesPayload,
    ) -> Result<Vec<TimeseriesPoint<OutcomeCounts>>, RpcError>;

    /// `keys.activeKeysTimeseries`: distinct active keys per bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn active_keys_timeseries(
        &self,
        payload: &TimeseriesPayload,
    ) -> Result<Vec<TimeseriesPoint<u64>>, RpcError>;

    /// `key.spentCredits`: credits spent per bucket.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn spent_credits_timeseries(
        &self,
        payload: &SpentCreditsPayload,
    ) -> Result<Vec<TimeseriesPoint<u64>>, RpcError>;

    /// `rootKey.create`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn create_root_key(&self, request: &CreateRootKeyRequest) -> Result<CreatedRootKey, RpcError>;

    /// `rootKey.update.permissions`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] when the call fails.
    fn update_root_key_permissions(
        &self,
        request: &UpdateRootKeyPermissionsRequest,
    ) -> Result<(), RpcError>;
}
