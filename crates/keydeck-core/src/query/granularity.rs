// crates/keydeck-core/src/query/granularity.rs
// ============================================================================
// Module: Timeseries Granularity
// Description: Bucket size selection for chart queries.
// Purpose: Keep point counts bounded as the window grows.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Chart queries pick their bucket size from the resolved window length, so a
//! one-hour chart gets minute buckets and a quarter gets daily ones.

use serde::Deserialize;
use serde::Serialize;

use crate::query::window::TimeWindow;

/// One minute in milliseconds.
const MINUTE: i64 = 60_000;
/// One hour in milliseconds.
const HOUR: i64 = 60 * MINUTE;
/// One day in milliseconds.
const DAY: i64 = 24 * HOUR;

/// Bucket size of a timeseries query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    /// One-minute buckets.
    PerMinute,
    /// Five-minute buckets.
    Per5Minutes,
    /// Fifteen-minute buckets.
    Per15Minutes,
    /// Hourly buckets.
    PerHour,
    /// Three-hour buckets.
    Per3Hours,
    /// Six-hour buckets.
    Per6Hours,
    /// Daily buckets.
    PerDay,
    /// Weekly buckets.
    PerWeek,
}

impl Granularity {
    /// Picks the bucket size for a window.
    #[must_use]
    pub const fn for_window(window: &TimeWindow) -> Self {
        let duration = window.duration_ms();
        if duration <= HOUR {
            Self::PerMinute
        } else if duration <= 4 * HOUR {
            Self::Per5Minutes
        } else if duration <= 12 * HOUR {
            Self::Per15Minutes
        } else if duration <= DAY {
            Self::PerHour
        } else if duration <= 3 * DAY {
            Self::Per3Hours
        } else if duration <= 7 * DAY {
            Self::Per6Hours
        } else if duration <= 30 * DAY {
            Self::PerDay
        } else {
            Self::PerWeek
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Granularity;
    use crate::query::window::TimeWindow;

    fn window(hours: i64) -> TimeWindow {
        TimeWindow {
            start_time: 0,
            end_time: hours * 3_600_000,
            since: None,
        }
    }

    #[test]
    fn default_window_uses_quarter_hours() {
        assert_eq!(Granularity::for_window(&window(12)), Granularity::Per15Minutes);
    }

    #[test]
    fn buckets_grow_with_the_window() {
        let steps: Vec<_> = [1, 3, 24, 48, 24 * 7, 24 * 30, 24 * 90]
            .iter()
            .map(|hours| Granularity::for_window(&window(*hours)))
            .collect();
        assert!(steps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn wire_tokens_are_camel_case() {
        let token = serde_json::to_value(Granularity::Per15Minutes).ok();
        assert_eq!(token, Some(serde_json::json!("per15Minutes")));
    }
}
