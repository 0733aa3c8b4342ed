// crates/keydeck-core/src/filters/codec.rs
// ============================================================================
// Module: Filter Parameter Codec
// Description: Encoding of array-valued filter slots inside one URL parameter.
// Purpose: Round-trip `operator:value` lists through a single string.
// Dependencies: crate::filters::model
// ============================================================================

//! ## Overview
//! Array slots hold comma-separated `operator:value` items. Inside a value,
//! `%` and `,` are escaped as `%25` and `%2C` so any text survives the trip.
//! The split between operator and value is the first `:`; later colons belong
//! to the value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::filters::model::FilterOperator;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A stored item that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Missing separator or empty value.
    Malformed(String),
    /// Operator token not recognized.
    UnknownOperator(String),
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes array items into one parameter value.
#[must_use]
pub fn encode_array(items: &[(FilterOperator, String)]) -> String {
    items
        .iter()
        .map(|(operator, value)| format!("{}:{}", operator.as_str(), escape(value)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes one parameter value into items, keeping undecodable ones as errors.
#[must_use]
pub fn decode_array(raw: &str) -> Vec<Result<(FilterOperator, String), ItemError>> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(decode_item).collect()
}

/// Decodes a single `operator:value` item.
fn decode_item(item: &str) -> Result<(FilterOperator, String), ItemError> {
    let Some((token, value)) = item.split_once(':') else {
        return Err(ItemError::Malformed(item.to_string()));
    };
    if value.is_empty() {
        return Err(ItemError::Malformed(item.to_string()));
    }
    let operator =
        FilterOperator::parse(token).ok_or_else(|| ItemError::UnknownOperator(token.to_string()))?;
    Ok((operator, unescape(value)))
}

/// Escapes the item separator and the escape character.
fn escape(value: &str) -> String {
    value.replace('%', "%25").replace(',', "%2C")
}

/// Reverses [`escape`]; unknown escapes are kept literally.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(index) = rest.find('%') {
        out.push_str(&rest[.. index]);
        let tail = &rest[index ..];
        if tail.starts_with("%25") {
            out.push('%');
            rest = &tail[3 ..];
        } else if tail.starts_with("%2C") || tail.starts_with("%2c") {
            out.push(',');
            rest = &tail[3 ..];
        } else {
            out.push('%');
            rest = &tail[1 ..];
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
