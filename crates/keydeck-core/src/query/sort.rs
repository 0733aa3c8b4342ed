// crates/keydeck-core/src/query/sort.rs
// ============================================================================
// Module: Sort State
// Description: Sort order persisted in the `sorts` query parameter.
// Purpose: Keep column sorting alongside filters in the same query state.
// Dependencies: crate::{diagnostics, filters}, serde
// ============================================================================

//! ## Overview
//! The `sorts` parameter holds comma-separated `column:direction` items, in
//! priority order. Unknown columns, unknown directions, and repeated columns
//! are dropped with an `invalid_sort` diagnostic.

use serde::Deserialize;
use serde::Serialize;

use crate::diagnostics::DiagnosticEvent;
use crate::diagnostics::DiagnosticSink;
use crate::diagnostics::DropReason;
use crate::filters::QueryParams;

/// Query parameter that stores the sort order.
pub const SORTS_PARAM: &str = "sorts";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parses a wire token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column name.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a sort key.
    #[must_use]
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }
}

/// Reads the sort order, keeping only keys on `allowed` columns.
#[must_use]
pub fn read_sorts(
    params: &QueryParams,
    allowed: &[&str],
    view: &'static str,
    diagnostics: &dyn DiagnosticSink,
) -> Vec<SortSpec> {
    let Some(raw) = params.get(SORTS_PARAM).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };
    let mut sorts: Vec<SortSpec> = Vec::new();
    for item in raw.split(',') {
        let parsed = item.split_once(':').and_then(|(column, direction)| {
            let direction = SortDirection::parse(direction)?;
            let known = allowed.contains(&column);
            let repeated = sorts.iter().any(|sort| sort.column == column);
            (known && !repeated).then(|| SortSpec::new(column, direction))
        });
        match parsed {
            Some(sort) => sorts.push(sort),
            None => diagnostics.record(&DiagnosticEvent::new(
                view,
                SORTS_PARAM,
                DropReason::InvalidSort,
                Some(item.to_string()),
            )),
        }
    }
    sorts
}

/// Writes the sort order, removing the parameter when empty.
pub fn write_sorts(params: &mut QueryParams, sorts: &[SortSpec]) {
    if sorts.is_empty() {
        params.remove(SORTS_PARAM);
        return;
    }
    let encoded = sorts
        .iter()
        .map(|sort| format!("{}:{}", sort.column, sort.direction.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    params.set(SORTS_PARAM, encoded);
}

#[cfg(test)]
mod tests {
    use super::SortDirection;
    use super::SortSpec;
    use super::read_sorts;
    use super::write_sorts;
    use crate::diagnostics::DropReason;
    use crate::diagnostics::MemoryDiagnosticSink;
    use crate::filters::QueryParams;

    #[test]
    fn sorts_roundtrip_and_drop_unknown_columns() {
        let sink = MemoryDiagnosticSink::new();
        let params = QueryParams::parse("sorts=time:desc,color:asc,valid:up,time:asc");
        let sorts = read_sorts(&params, &["time", "valid"], "test", &sink);
        assert_eq!(sorts, vec![SortSpec::new("time", SortDirection::Desc)]);
        assert_eq!(sink.reasons(), vec![DropReason::InvalidSort; 3]);

        let mut written = QueryParams::new();
        write_sorts(&mut written, &sorts);
        assert_eq!(written.get("sorts"), Some("time:desc"));
        write_sorts(&mut written, &[]);
        assert!(written.is_empty());
    }
}
