// crates/keydeck-core/src/filters/model.rs
// ============================================================================
// Module: Filter Model
// Description: Filter values, operators, field configuration, and field trait.
// Purpose: Describe what a view accepts and normalize individual filter values.
// Dependencies: crate::diagnostics, serde
// ============================================================================

//! ## Overview
//! Each view declares an enum of fields implementing [`FilterField`]. A field's
//! [`FilterFieldConfig`] lists its allowed operators (the first one doubles as
//! the fallback), its value kind, an optional allow-list, and whether it is
//! stored as an array or a scalar URL parameter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::diagnostics::DropReason;

// ============================================================================
// SECTION: Operators and Values
// ============================================================================

/// Comparison operator applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// Exact match.
    Is,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

impl FilterOperator {
    /// Returns the wire token for the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
        }
    }

    /// Parses a wire token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "is" => Some(Self::Is),
            "contains" => Some(Self::Contains),
            "startsWith" => Some(Self::StartsWith),
            "endsWith" => Some(Self::EndsWith),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter value: free text or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Integer value (timestamps).
    Number(i64),
    /// Text value.
    Text(String),
}

impl FilterValue {
    /// Returns the value as it is written into a URL parameter.
    #[must_use]
    pub fn to_param_string(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    /// Returns the value as an integer, accepting numeric strings.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(value) => value.trim().parse().ok(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Presentation hints attached to a filter chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMetadata {
    /// Colour class for the chip.
    pub color_class: String,
}

/// Opaque filter identifier.
///
/// # Invariants
/// - Ids are unique within a process but not stable across derivations; they
///   only key list entries between one derivation and the next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(u64);

impl FilterId {
    /// Returns a fresh identifier.
    #[must_use]
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter-{}", self.0)
    }
}

// ============================================================================
// SECTION: Field Configuration
// ============================================================================

/// Value kind accepted by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text (optionally constrained by an allow-list).
    Text,
    /// Integer, given as a number or a numeric string.
    Number,
}

/// How a field is stored in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSlot {
    /// Comma-separated `operator:value` items.
    Array,
    /// A single raw value; the operator is implied.
    Scalar,
}

/// Legality rules for one field of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterFieldConfig {
    /// Accepted value kind.
    pub kind: ValueKind,
    /// Allowed operators; the first is the fallback.
    pub operators: &'static [FilterOperator],
    /// Optional allow-list for text values.
    pub allowed_values: Option<&'static [&'static str]>,
    /// URL storage slot.
    pub slot: ParamSlot,
}

/// Operators used by free-text identifier fields.
pub const TEXT_OPERATORS: &[FilterOperator] = &[
    FilterOperator::Is,
    FilterOperator::Contains,
    FilterOperator::StartsWith,
    FilterOperator::EndsWith,
];

/// Operators used by exact-match fields.
pub const EXACT_OPERATORS: &[FilterOperator] = &[FilterOperator::Is];

impl FilterFieldConfig {
    /// Free-text array field with every text operator.
    #[must_use]
    pub const fn text_array() -> Self {
        Self {
            kind: ValueKind::Text,
            operators: TEXT_OPERATORS,
            allowed_values: None,
            slot: ParamSlot::Array,
        }
    }

    /// Exact-match array field constrained to `allowed`.
    #[must_use]
    pub const fn enum_array(allowed: &'static [&'static str]) -> Self {
        Self {
            kind: ValueKind::Text,
            operators: EXACT_OPERATORS,
            allowed_values: Some(allowed),
            slot: ParamSlot::Array,
        }
    }

    /// Numeric scalar field.
    #[must_use]
    pub const fn number_scalar() -> Self {
        Self {
            kind: ValueKind::Number,
            operators: EXACT_OPERATORS,
            allowed_values: None,
            slot: ParamSlot::Scalar,
        }
    }

    /// Text scalar field.
    #[must_use]
    pub const fn text_scalar() -> Self {
        Self {
            kind: ValueKind::Text,
            operators: EXACT_OPERATORS,
            allowed_values: None,
            slot: ParamSlot::Scalar,
        }
    }

    /// Returns the fallback operator.
    #[must_use]
    pub fn fallback_operator(&self) -> FilterOperator {
        self.operators.first().copied().unwrap_or(FilterOperator::Is)
    }

    /// Returns the operator to use and whether it was coerced.
    #[must_use]
    pub fn resolve_operator(&self, requested: FilterOperator) -> (FilterOperator, bool) {
        if self.operators.contains(&requested) {
            (requested, false)
        } else {
            (self.fallback_operator(), true)
        }
    }

    /// Normalizes a value for this field.
    ///
    /// # Errors
    ///
    /// Returns the [`DropReason`] when the value cannot be accepted.
    pub fn accept_value(&self, value: &FilterValue) -> Result<FilterValue, DropReason> {
        match self.kind {
            ValueKind::Number => {
                value.as_number().map(FilterValue::Number).ok_or(DropReason::NotNumeric)
            }
            ValueKind::Text => {
                let text = value.to_param_string();
                if text.is_empty() {
                    return Err(DropReason::MalformedParam);
                }
                match self.allowed_values {
                    Some(allowed) if !allowed.contains(&text.as_str()) => {
                        Err(DropReason::NotAllowed)
                    }
                    _ => Ok(FilterValue::Text(text)),
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Field Trait
// ============================================================================

/// Field enum of one view.
pub trait FilterField:
    Copy + Eq + Ord + Hash + fmt::Debug + Serialize + Send + Sync + 'static
{
    /// View label used in diagnostics.
    const VIEW: &'static str;

    /// Every field, in the order filters are listed.
    fn all() -> &'static [Self];

    /// Field name; doubles as the URL parameter name.
    fn as_str(self) -> &'static str;

    /// Legality rules for the field.
    fn config(self) -> FilterFieldConfig;

    /// Parses a field name.
    fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.as_str() == name)
    }

    /// Presentation hints for a value of this field.
    fn metadata_for(self, _value: &FilterValue) -> Option<FilterMetadata> {
        None
    }
}

// ============================================================================
// SECTION: Filter
// ============================================================================

/// One field/operator/value constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter<F> {
    /// Opaque identifier.
    pub id: FilterId,
    /// Constrained field.
    pub field: F,
    /// Operator.
    pub operator: FilterOperator,
    /// Value.
    pub value: FilterValue,
    /// Optional presentation hints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FilterMetadata>,
}

impl<F: FilterField> Filter<F> {
    /// Creates a filter with a fresh id and field-derived metadata.
    #[must_use]
    pub fn new(field: F, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        let metadata = field.metadata_for(&value);
        Self {
            id: FilterId::fresh(),
            field,
            operator,
            value,
            metadata,
        }
    }

    /// Returns the constraint without the id, for id-insensitive comparison.
    #[must_use]
    pub fn constraint(&self) -> (F, FilterOperator, FilterValue) {
        (self.field, self.operator, self.value.clone())
    }
}
