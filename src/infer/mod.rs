//! Column type inference (verb module)
//!
//! Assigns a [`ColumnType`] to result columns when the driver hands back
//! plain values without a typed schema, and classifies bare field names for
//! synthetic datasets.
//!
//! Everything here is best-effort. The rules exist because the engine
//! sometimes runs without a live schema (fallback and demo data); a wrong
//! guess degrades chart formatting, never the data itself.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::model::ColumnType;

static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date regex")
});

const FRACTIONAL_TYPES: [&str; 5] = ["decimal", "float", "numeric", "real", "double"];
const TEMPORAL_TYPES: [&str; 3] = ["date", "time", "timestamp"];

const MEASURE_NAME_HINTS: [&str; 7] = ["amount", "price", "cost", "total", "count", "sum", "value"];
const TEMPORAL_NAME_HINTS: [&str; 4] = ["date", "data", "created", "updated"];

/// Infer a column type, first matching rule wins:
///
/// 1. declared type names a number (`int`, `decimal`, `float`, `numeric`,
///    `real`, `double`): `integer` when only `int` is declared and the sample
///    is whole, `numeric` otherwise
/// 2. declared type names a date or time: `date`
/// 3. declared type names a boolean: `boolean`
/// 4. sample value: numbers by integrality, date-looking strings as `date`,
///    anything else `text`
/// 5. with no declared type and no sample at all, the field name decides
pub fn infer_column_type(declared: Option<&str>, sample: Option<&Value>, name: &str) -> ColumnType {
    if let Some(column_type) = declared.and_then(|d| infer_from_declared(d, sample)) {
        return column_type;
    }

    match sample {
        Some(value) if !value.is_null() => infer_from_value(value),
        _ if declared.is_none() => infer_from_name(name),
        _ => ColumnType::Text,
    }
}

/// Rules 1-3: map a source database type name
pub fn infer_from_declared(declared: &str, sample: Option<&Value>) -> Option<ColumnType> {
    let lower = declared.to_lowercase();

    let fractional = FRACTIONAL_TYPES.iter().any(|t| lower.contains(t));
    if fractional || lower.contains("int") {
        let whole = sample.map_or(true, |v| v.is_null() || is_whole_number(v));
        return Some(if !fractional && whole {
            ColumnType::Integer
        } else {
            ColumnType::Numeric
        });
    }

    if TEMPORAL_TYPES.iter().any(|t| lower.contains(t)) {
        return Some(ColumnType::Date);
    }

    if lower.contains("bool") {
        return Some(ColumnType::Boolean);
    }

    None
}

/// Rule 4: inspect a sample value
pub fn infer_from_value(value: &Value) -> ColumnType {
    match value {
        Value::Number(_) if is_whole_number(value) => ColumnType::Integer,
        Value::Number(_) => ColumnType::Numeric,
        Value::Bool(_) => ColumnType::Boolean,
        Value::String(s) if looks_like_date(s) => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// Rule 5: guess from the field name alone
pub fn infer_from_name(name: &str) -> ColumnType {
    match classify_field_name(name) {
        FieldRole::Measure => ColumnType::Numeric,
        FieldRole::Temporal => ColumnType::Date,
        FieldRole::Identifier | FieldRole::Category => ColumnType::Text,
    }
}

/// What a bare field name suggests the column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Numeric quantity worth aggregating
    Measure,
    /// Date or timestamp
    Temporal,
    /// Opaque identifier, text even when numeric-looking
    Identifier,
    /// Anything else
    Category,
}

pub fn classify_field_name(name: &str) -> FieldRole {
    let lower = name.to_lowercase();
    if MEASURE_NAME_HINTS.iter().any(|h| lower.contains(h)) {
        FieldRole::Measure
    } else if TEMPORAL_NAME_HINTS.iter().any(|h| lower.contains(h)) {
        FieldRole::Temporal
    } else if lower.contains("id") {
        FieldRole::Identifier
    } else {
        FieldRole::Category
    }
}

/// `YYYY-MM-DD` prefix, which also covers ISO-8601 timestamps ending in `Z`
pub fn looks_like_date(s: &str) -> bool {
    DATE_PREFIX.is_match(s)
}

fn is_whole_number(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    }
}
