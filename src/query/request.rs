use serde::{Deserialize, Serialize};

use crate::model::{Aggregation, ColumnType, SortDirection, TimeGrain};
use super::filter::DataFilter;

/// A grouping field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub field: String,
    /// Output column name, defaults to `field`
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub time_grain: Option<TimeGrain>,
    /// Declared column type, when the caller knows it (e.g. `date`, `boolean`)
    #[serde(default, rename = "type")]
    pub declared_type: Option<ColumnType>,
}

impl Dimension {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
            time_grain: None,
            declared_type: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_time_grain(mut self, grain: TimeGrain) -> Self {
        self.time_grain = Some(grain);
        self
    }

    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.declared_type = Some(column_type);
        self
    }

    /// Name of the output column
    pub fn output_name(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => alias,
            _ => &self.field,
        }
    }
}

/// A field paired with an aggregation function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub field: String,
    pub agg: Aggregation,
    /// Output column name, defaults to `<field>_<agg>`
    #[serde(default)]
    pub alias: Option<String>,
}

impl Metric {
    pub fn new(field: impl Into<String>, agg: Aggregation) -> Self {
        Self {
            field: field.into(),
            agg,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name of the output column
    pub fn output_name(&self) -> String {
        match self.alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => alias.to_string(),
            _ if self.field == "*" => self.agg.to_string(),
            _ => format!("{}_{}", self.field, self.agg),
        }
    }
}

/// A requested ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub dir: SortDirection,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), dir: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), dir: SortDirection::Desc }
    }
}

/// Request describing what to compute over a dataset
///
/// Built per chart render or ad-hoc query; never persisted on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    /// Dataset reference
    #[serde(default, alias = "datasetRef")]
    pub dataset: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub filters: Vec<DataFilter>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    /// Requested row limit, clamped by the planner
    #[serde(default)]
    pub limit: Option<u64>,
}

impl AggregationSpec {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_filter(mut self, filter: DataFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of output columns (dimensions then metrics)
    pub fn width(&self) -> usize {
        self.dimensions.len() + self.metrics.len()
    }
}
