use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Filter predicate on a dataset field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DataFilter {
    pub field: String,
    /// Optional operator, defaults to "in" for array values or "eq" for single values
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl DataFilter {
    pub fn new(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            operator: None,
            value: value.into(),
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    /// Resolve the effective operator
    pub fn resolved_operator(&self) -> Result<FilterOperator, ParseFilterOperatorError> {
        match self.operator.as_deref().map(str::trim) {
            Some(op) if !op.is_empty() => op.parse(),
            _ if self.value.is_array() => Ok(FilterOperator::In),
            _ => Ok(FilterOperator::Eq),
        }
    }
}

/// Filter comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    In,
    NotIn,
    /// Substring match
    Contains,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// Whether the operator ignores the filter value
    pub fn is_unary(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Whether the operator expects a list value
    pub fn is_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterOperator::Eq => "eq",
            FilterOperator::NotEq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::GtEq => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::LtEq => "lte",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Contains => "contains",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown filter operator '{input}'")]
pub struct ParseFilterOperatorError {
    pub input: String,
}

impl FromStr for FilterOperator {
    type Err = ParseFilterOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eq" | "=" | "==" => Ok(FilterOperator::Eq),
            "neq" | "ne" | "!=" | "<>" => Ok(FilterOperator::NotEq),
            "gt" | ">" => Ok(FilterOperator::Gt),
            "gte" | ">=" => Ok(FilterOperator::GtEq),
            "lt" | "<" => Ok(FilterOperator::Lt),
            "lte" | "<=" => Ok(FilterOperator::LtEq),
            "in" => Ok(FilterOperator::In),
            "not_in" | "nin" | "not in" => Ok(FilterOperator::NotIn),
            "contains" | "like" => Ok(FilterOperator::Contains),
            "is_null" | "null" => Ok(FilterOperator::IsNull),
            "is_not_null" | "not_null" => Ok(FilterOperator::IsNotNull),
            _ => Err(ParseFilterOperatorError { input: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_operator_from_value_shape() {
        let f = DataFilter::new("region", json!(["A", "B"]));
        assert_eq!(f.resolved_operator().unwrap(), FilterOperator::In);

        let f = DataFilter::new("region", "A");
        assert_eq!(f.resolved_operator().unwrap(), FilterOperator::Eq);
    }

    #[test]
    fn test_explicit_operator_and_symbols() {
        let f = DataFilter::new("qty", 3).with_operator(">=");
        assert_eq!(f.resolved_operator().unwrap(), FilterOperator::GtEq);
        let f = DataFilter::new("qty", 3).with_operator("<>");
        assert_eq!(f.resolved_operator().unwrap(), FilterOperator::NotEq);
        let f = DataFilter::new("name", "ab").with_operator("LIKE");
        assert_eq!(f.resolved_operator().unwrap(), FilterOperator::Contains);
    }

    #[test]
    fn test_unknown_operator() {
        let f = DataFilter::new("qty", 3).with_operator("between");
        assert!(f.resolved_operator().is_err());
    }
}
