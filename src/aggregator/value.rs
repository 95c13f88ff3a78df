//! Value coercion and ordering for in-memory evaluation

use chrono::{DateTime, Datelike, NaiveDate};
use serde_json::{Number, Value};
use std::cmp::Ordering;

use crate::model::TimeGrain;

/// Largest magnitude emitted as a JSON integer
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric value of a cell. Anything unparsable counts as `0`.
pub fn coerce_number(value: &Value) -> f64 {
    try_number(value).unwrap_or(0.0)
}

/// Numeric value of a cell, if it has one. Booleans count as `1`/`0`,
/// strings are parsed after trimming.
pub fn try_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// JSON representation of an aggregate: integral results become integers
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Text form used for loose comparisons
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Canonical grouping key for one dimension value.
///
/// Equal numbers share a key whatever their JSON spelling (`1` and `1.0`).
/// Text stays quoted, so `"1"` is still its own group.
pub fn key_of(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| number_value(f).to_string())
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Total order used for sorting result rows:
/// null < bool < number < string < array < object
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Bucket a date-like value to the start of its grain, as `YYYY-MM-DD`.
///
/// Accepts `YYYY-MM-DD` prefixed strings (dates, ISO timestamps) and
/// numbers as epoch milliseconds. Anything else buckets to null.
pub fn truncate_to_grain(value: &Value, grain: TimeGrain) -> Value {
    let Some(date) = parse_date(value) else {
        return Value::Null;
    };

    let bucket = match grain {
        TimeGrain::Day => Some(date),
        TimeGrain::Month => date.with_day(1),
        TimeGrain::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    };

    bucket
        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let prefix = s.trim().get(..10)?;
            NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
        }
        Value::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        _ => None,
    }
}
