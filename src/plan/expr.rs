//! Expression types for the plan

use serde_json::Value;

use crate::query::FilterOperator;

/// A row predicate: field op value
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Base column the predicate reads
    pub field: String,
    pub op: FilterOperator,
    /// Comparison operand; an array for `In`/`NotIn`, ignored by the null checks
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Operand values for list operators. A scalar operand is a one-item list.
    pub fn list_values(&self) -> Vec<&Value> {
        match &self.value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}
