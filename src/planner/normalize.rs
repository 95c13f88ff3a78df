//! Filter and ORDER BY normalization
//!
//! ORDER BY may only reference columns of the SELECT list. A reference is
//! matched against output names first, then dimension fields, then metric
//! fields, and always rewritten to the output column.

use serde_json::Value;

use crate::error::AggregationError;
use crate::plan::{Predicate, SelectItem, SortKey};
use crate::query::{DataFilter, FilterOperator, OrderBy};

pub fn resolve_filters(filters: &[DataFilter]) -> Result<Vec<Predicate>, AggregationError> {
    filters.iter().map(resolve_filter).collect()
}

fn resolve_filter(filter: &DataFilter) -> Result<Predicate, AggregationError> {
    let field = filter.field.trim();
    if field.is_empty() {
        return Err(AggregationError::MissingParams("filter field".to_string()));
    }

    let op = filter
        .resolved_operator()
        .map_err(|e| AggregationError::InvalidParams(e.to_string()))?;

    let needs_value = !op.is_unary() && !matches!(op, FilterOperator::Eq | FilterOperator::NotEq);
    if needs_value && filter.value.is_null() {
        return Err(AggregationError::InvalidParams(format!(
            "filter '{}' on '{}' requires a value",
            op, field
        )));
    }
    if !op.is_list() && matches!(filter.value, Value::Array(_) | Value::Object(_)) && !op.is_unary() {
        return Err(AggregationError::InvalidParams(format!(
            "filter '{}' on '{}' requires a scalar value",
            op, field
        )));
    }

    Ok(Predicate::new(field, op, filter.value.clone()))
}

pub fn resolve_order_by(order_by: &[OrderBy], select: &[SelectItem]) -> Result<Vec<SortKey>, AggregationError> {
    order_by
        .iter()
        .map(|order| {
            let field = order.field.trim();
            if field.is_empty() {
                return Err(AggregationError::MissingParams("orderBy field".to_string()));
            }
            let position = find_output_position(field, select).ok_or_else(|| {
                AggregationError::InvalidParams(format!(
                    "orderBy field '{}' is not a requested dimension or metric",
                    field
                ))
            })?;
            Ok(SortKey { position, direction: order.dir })
        })
        .collect()
}

fn find_output_position(field: &str, select: &[SelectItem]) -> Option<usize> {
    select
        .iter()
        .position(|item| item.output_name() == field)
        .or_else(|| {
            select.iter().position(|item| matches!(item, SelectItem::Dimension(d) if d.field == field))
        })
        .or_else(|| {
            select.iter().position(|item| matches!(item, SelectItem::Metric(m) if m.field == field))
        })
}
