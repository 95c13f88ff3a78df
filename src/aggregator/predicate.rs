//! Row filtering
//!
//! Mirrors SQL semantics where it matters for charts: a null cell never
//! satisfies a comparison, only the null checks. A null list element never
//! equals anything, so `NOT IN` over a list holding null matches no row.

use serde_json::Value;
use std::cmp::Ordering;

use crate::plan::Predicate;
use crate::query::FilterOperator;
use super::value::{text_of, try_number};
use super::Row;

pub fn row_matches(predicates: &[Predicate], row: &Row) -> bool {
    predicates.iter().all(|p| predicate_matches(p, row))
}

fn predicate_matches(predicate: &Predicate, row: &Row) -> bool {
    let cell = row.get(&predicate.field).unwrap_or(&Value::Null);

    match predicate.op {
        FilterOperator::IsNull => return cell.is_null(),
        FilterOperator::IsNotNull => return !cell.is_null(),
        FilterOperator::Eq if predicate.value.is_null() => return cell.is_null(),
        FilterOperator::NotEq if predicate.value.is_null() => return !cell.is_null(),
        _ if cell.is_null() => return false,
        _ => {}
    }

    let operand = &predicate.value;
    match predicate.op {
        FilterOperator::Eq => loose_eq(cell, operand),
        FilterOperator::NotEq => !loose_eq(cell, operand),
        FilterOperator::Gt => loose_cmp(cell, operand) == Ordering::Greater,
        FilterOperator::GtEq => loose_cmp(cell, operand) != Ordering::Less,
        FilterOperator::Lt => loose_cmp(cell, operand) == Ordering::Less,
        FilterOperator::LtEq => loose_cmp(cell, operand) != Ordering::Greater,
        FilterOperator::In => predicate.list_values().into_iter().any(|v| loose_eq(cell, v)),
        FilterOperator::NotIn => predicate
            .list_values()
            .into_iter()
            .all(|v| !v.is_null() && !loose_eq(cell, v)),
        FilterOperator::Contains => text_of(cell).contains(&text_of(operand)),
        FilterOperator::IsNull => false,
        FilterOperator::IsNotNull => true,
    }
}

/// Numeric comparison when both sides are numbers, text comparison otherwise
fn loose_cmp(a: &Value, b: &Value) -> Ordering {
    match (try_number(a), try_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => text_of(a).cmp(&text_of(b)),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    loose_cmp(a, b) == Ordering::Equal
}
