//! Plan node types

use crate::envelope::ResultColumn;
use crate::model::{Aggregation, ColumnType, SortDirection, TimeGrain};
use super::expr::Predicate;

/// A validated aggregation over one derived table
///
/// `select` holds dimensions first, then metrics, in request order.
/// `group_by` holds the 1-based ordinals of the dimension items and is
/// built in the same pass as `select`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePlan {
    /// Dataset reference the plan was built for
    pub dataset: String,
    pub select: Vec<SelectItem>,
    /// 1-based positions into `select`
    pub group_by: Vec<usize>,
    /// AND-ed predicates over base columns
    pub filters: Vec<Predicate>,
    /// Explicit ordering; empty means "ORDER BY 1" in SQL and first-seen
    /// group order in memory
    pub order_by: Vec<SortKey>,
    /// Clamped row limit
    pub limit: u64,
}

impl AggregatePlan {
    /// Result columns in output order
    pub fn columns(&self) -> Vec<ResultColumn> {
        self.select
            .iter()
            .map(|item| ResultColumn::new(item.output_name(), item.column_type()))
            .collect()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &DimensionItem> {
        self.select.iter().filter_map(|item| match item {
            SelectItem::Dimension(d) => Some(d),
            SelectItem::Metric(_) => None,
        })
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricItem> {
        self.select.iter().filter_map(|item| match item {
            SelectItem::Metric(m) => Some(m),
            SelectItem::Dimension(_) => None,
        })
    }

    pub fn has_dimensions(&self) -> bool {
        !self.group_by.is_empty()
    }
}

/// An entry of the outer SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Dimension(DimensionItem),
    Metric(MetricItem),
}

impl SelectItem {
    pub fn output_name(&self) -> &str {
        match self {
            SelectItem::Dimension(d) => &d.alias,
            SelectItem::Metric(m) => &m.alias,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            SelectItem::Dimension(d) => d.column_type,
            SelectItem::Metric(m) => m.func.result_type(),
        }
    }
}

/// Grouping column
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionItem {
    pub field: String,
    pub alias: String,
    pub time_grain: Option<TimeGrain>,
    pub column_type: ColumnType,
}

/// Aggregated column: func(field) AS alias
#[derive(Debug, Clone, PartialEq)]
pub struct MetricItem {
    /// Source field, or `*` for COUNT(*)
    pub field: String,
    pub func: Aggregation,
    pub alias: String,
}

impl MetricItem {
    pub fn is_wildcard(&self) -> bool {
        self.field == "*"
    }
}

/// A sort key referencing an output column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKey {
    /// 0-based position into `AggregatePlan::select`
    pub position: usize,
    pub direction: SortDirection,
}
