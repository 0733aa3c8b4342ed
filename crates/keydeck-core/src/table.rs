// crates/keydeck-core/src/table.rs
// ============================================================================
// Module: Table Render Descriptors
// Description: Tagged column and cell variants plus a plain-text renderer.
// Purpose: Describe table output as data instead of render callbacks.
// Dependencies: crate::{core, interfaces}, serde, time
// ============================================================================

//! ## Overview
//! Rows project themselves into [`Cell`] values; [`render_cell`] turns a cell
//! into display text and an optional colour class, and [`TableRenderer`]
//! lays the rendered cells out as aligned text. Count and severity columns
//! are right-aligned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::VerificationOutcome;
use crate::core::classify_severity;
use crate::core::error_percentage;
use crate::core::format_outcome_label;
use crate::interfaces::KeyOverviewRow;
use crate::interfaces::VerificationLogRow;

/// Placeholder for missing values.
const EMPTY: &str = "-";
/// Column separator.
const GAP: &str = "  ";

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Kind of a column; drives alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free text.
    Text,
    /// Timestamp.
    Timestamp,
    /// Verification outcome badge.
    Outcome,
    /// Integer count.
    Count,
    /// Error-rate severity badge.
    Severity,
    /// Tag list.
    Tags,
}

impl ColumnKind {
    /// Returns true for right-aligned kinds.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Count | Self::Severity)
    }
}

/// Column descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Stable column key (also the sort column name).
    pub key: &'static str,
    /// Header text.
    pub header: &'static str,
    /// Column kind.
    pub kind: ColumnKind,
}

impl Column {
    /// Creates a column descriptor.
    #[must_use]
    pub const fn new(key: &'static str, header: &'static str, kind: ColumnKind) -> Self {
        Self {
            key,
            header,
            kind,
        }
    }
}

/// Cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// Free text; `None` renders as a placeholder.
    Text(Option<String>),
    /// Milliseconds since epoch; `None` renders as a placeholder.
    Timestamp(Option<i64>),
    /// Outcome code as reported.
    Outcome(String),
    /// Integer count.
    Count(u64),
    /// Valid and error counts summarized as a severity badge.
    Severity {
        /// Valid count.
        valid: u64,
        /// Error count.
        error: u64,
    },
    /// Tag list.
    Tags(Vec<String>),
}

/// Display text and colour for one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCell {
    /// Display text.
    pub text: String,
    /// Optional colour class.
    pub color_class: Option<&'static str>,
}

impl RenderedCell {
    /// Plain text without colour.
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color_class: None,
        }
    }
}

/// Renders one cell.
#[must_use]
pub fn render_cell(cell: &Cell) -> RenderedCell {
    match cell {
        Cell::Text(text) => RenderedCell::plain(text.as_deref().unwrap_or(EMPTY)),
        Cell::Timestamp(ms) => {
            RenderedCell::plain(ms.map_or_else(|| EMPTY.to_string(), format_timestamp))
        }
        Cell::Outcome(code) => RenderedCell {
            text: format_outcome_label(code),
            color_class: VerificationOutcome::parse(code).map(VerificationOutcome::color_class),
        },
        Cell::Count(count) => RenderedCell::plain(count.to_string()),
        Cell::Severity {
            valid,
            error,
        } => {
            let severity = classify_severity(*valid, *error);
            RenderedCell {
                text: format!("{:.1}%", error_percentage(*valid, *error)),
                color_class: Some(severity.color_class()),
            }
        }
        Cell::Tags(tags) if tags.is_empty() => RenderedCell::plain(EMPTY),
        Cell::Tags(tags) => RenderedCell::plain(tags.join(", ")),
    }
}

/// Formats milliseconds since epoch as RFC 3339, falling back to the raw value.
fn format_timestamp(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| ms.to_string())
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Row type with a fixed column layout.
pub trait TableRow {
    /// Column layout.
    fn columns() -> &'static [Column];

    /// Cells in column order.
    fn cells(&self) -> Vec<Cell>;
}

/// Keys overview columns.
const KEY_OVERVIEW_COLUMNS: &[Column] = &[
    Column::new("key", "KEY", ColumnKind::Text),
    Column::new("name", "NAME", ColumnKind::Text),
    Column::new("identity", "IDENTITY", ColumnKind::Text),
    Column::new("time", "LAST USED", ColumnKind::Timestamp),
    Column::new("valid", "VALID", ColumnKind::Count),
    Column::new("invalid", "INVALID", ColumnKind::Count),
    Column::new("errors", "ERRORS", ColumnKind::Severity),
];

impl TableRow for KeyOverviewRow {
    fn columns() -> &'static [Column] {
        KEY_OVERVIEW_COLUMNS
    }

    fn cells(&self) -> Vec<Cell> {
        let error = self.counts.error_count();
        vec![
            Cell::Text(Some(self.key_id.to_string())),
            Cell::Text(self.name.clone()),
            Cell::Text(self.identity.clone()),
            Cell::Timestamp(self.last_used),
            Cell::Count(self.counts.valid),
            Cell::Count(error),
            Cell::Severity {
                valid: self.counts.valid,
                error,
            },
        ]
    }
}

/// Verification log columns.
const VERIFICATION_LOG_COLUMNS: &[Column] = &[
    Column::new("time", "TIME", ColumnKind::Timestamp),
    Column::new("request", "REQUEST", ColumnKind::Text),
    Column::new("outcome", "OUTCOME", ColumnKind::Outcome),
    Column::new("region", "REGION", ColumnKind::Text),
    Column::new("tags", "TAGS", ColumnKind::Tags),
];

impl TableRow for VerificationLogRow {
    fn columns() -> &'static [Column] {
        VERIFICATION_LOG_COLUMNS
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Timestamp(Some(self.time)),
            Cell::Text(Some(self.request_id.clone())),
            Cell::Outcome(self.outcome.clone()),
            Cell::Text(Some(self.region.clone())),
            Cell::Tags(self.tags.clone()),
        ]
    }
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Lays out rows of cells as aligned plain text.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer<'a> {
    /// Column layout.
    columns: &'a [Column],
}

impl<'a> TableRenderer<'a> {
    /// Creates a renderer for `columns`.
    #[must_use]
    pub const fn new(columns: &'a [Column]) -> Self {
        Self {
            columns,
        }
    }

    /// Renders a header line followed by one line per row.
    ///
    /// Rows shorter than the layout are padded with placeholders; extra cells
    /// are ignored.
    #[must_use]
    pub fn render(&self, rows: &[Vec<Cell>]) -> String {
        let rendered: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                (0 .. self.columns.len())
                    .map(|index| {
                        row.get(index)
                            .map_or_else(|| EMPTY.to_string(), |cell| render_cell(cell).text)
                    })
                    .collect()
            })
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                rendered
                    .iter()
                    .map(|row| row[index].chars().count())
                    .chain(std::iter::once(column.header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let headers: Vec<String> =
            self.columns.iter().map(|column| column.header.to_string()).collect();
        let mut out = String::new();
        for line in std::iter::once(&headers).chain(rendered.iter()) {
            out.push_str(&self.render_line(line, &widths));
            out.push('\n');
        }
        out
    }

    /// Renders typed rows using their own layout.
    #[must_use]
    pub fn render_rows<R: TableRow>(rows: &[R]) -> String {
        let cells: Vec<Vec<Cell>> = rows.iter().map(TableRow::cells).collect();
        TableRenderer::new(R::columns()).render(&cells)
    }

    /// Pads one line of text cells.
    fn render_line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = self
            .columns
            .iter()
            .zip(cells.iter().zip(widths))
            .map(|(column, (text, width))| {
                if column.kind.is_numeric() {
                    format!("{text:>width$}")
                } else {
                    format!("{text:<width$}")
                }
            })
            .collect();
        padded.join(GAP).trim_end().to_string()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
