//! Aggregation planning entry point
//!
//! `plan_aggregation` validates an [`AggregationSpec`] and produces the
//! [`AggregatePlan`] both execution paths consume.

use tracing::debug;

use crate::config::QueryLimits;
use crate::error::AggregationError;
use crate::plan::{AggregatePlan, DimensionItem, MetricItem, SelectItem};
use crate::query::{AggregationSpec, Dimension, Metric};
use crate::model::ColumnType;
use super::normalize::{resolve_filters, resolve_order_by};

/// Plan an aggregation request.
///
/// 1. Rejects requests with neither dimensions nor metrics (`NO_FIELDS`)
/// 2. Builds the SELECT list and the positional GROUP BY together, so a
///    dimension's ordinal always matches its place in the list
/// 3. Resolves filters and ORDER BY against the request's own fields
/// 4. Clamps the limit to `[1, aggregate_max]`
pub fn plan_aggregation(
    spec: &AggregationSpec,
    limits: &QueryLimits,
) -> Result<AggregatePlan, AggregationError> {
    if spec.dimensions.is_empty() && spec.metrics.is_empty() {
        return Err(AggregationError::NoFields);
    }

    let mut select = Vec::with_capacity(spec.width());
    let mut group_by = Vec::with_capacity(spec.dimensions.len());

    for dimension in &spec.dimensions {
        select.push(SelectItem::Dimension(build_dimension(dimension)?));
        group_by.push(select.len());
    }
    for metric in &spec.metrics {
        select.push(SelectItem::Metric(build_metric(metric)?));
    }

    let filters = resolve_filters(&spec.filters)?;
    let order_by = resolve_order_by(&spec.order_by, &select)?;
    let limit = limits.clamp_aggregate(spec.limit);

    debug!(
        dataset = %spec.dataset,
        dimensions = group_by.len(),
        metrics = spec.metrics.len(),
        filters = filters.len(),
        limit,
        "planned aggregation"
    );

    Ok(AggregatePlan {
        dataset: spec.dataset.clone(),
        select,
        group_by,
        filters,
        order_by,
        limit,
    })
}

fn build_dimension(dimension: &Dimension) -> Result<DimensionItem, AggregationError> {
    let field = dimension.field.trim();
    if field.is_empty() {
        return Err(AggregationError::MissingParams("dimension field".to_string()));
    }
    if field == "*" {
        return Err(AggregationError::InvalidParams("'*' cannot be used as a dimension".to_string()));
    }

    let column_type = match (dimension.time_grain, dimension.declared_type) {
        (Some(_), _) => ColumnType::Date,
        (None, Some(declared)) => declared,
        (None, None) => ColumnType::Text,
    };

    Ok(DimensionItem {
        field: field.to_string(),
        alias: dimension.output_name().to_string(),
        time_grain: dimension.time_grain,
        column_type,
    })
}

fn build_metric(metric: &Metric) -> Result<MetricItem, AggregationError> {
    let field = metric.field.trim();
    if field.is_empty() {
        return Err(AggregationError::MissingParams(format!("field for {} metric", metric.agg)));
    }
    if field == "*" && !metric.agg.accepts_wildcard() {
        return Err(AggregationError::InvalidParams(format!(
            "{} cannot be applied to '*'",
            metric.agg
        )));
    }

    Ok(MetricItem {
        field: field.to_string(),
        func: metric.agg,
        alias: metric.output_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aggregation, SortDirection, TimeGrain};
    use crate::plan::SortKey;
    use crate::query::{DataFilter, OrderBy};

    fn sales_spec() -> AggregationSpec {
        AggregationSpec::new("sales")
            .with_dimension(Dimension::new("category"))
            .with_metric(Metric::new("amount", Aggregation::Sum))
    }

    #[test]
    fn test_rejects_empty_request() {
        let err = plan_aggregation(&AggregationSpec::new("sales"), &QueryLimits::default()).unwrap_err();
        assert_eq!(err, AggregationError::NoFields);
    }

    #[test]
    fn test_select_order_and_group_ordinals() {
        let spec = AggregationSpec::new("sales")
            .with_dimension(Dimension::new("region"))
            .with_metric(Metric::new("amount", Aggregation::Sum))
            .with_dimension(Dimension::new("created_at").with_time_grain(TimeGrain::Year));
        let plan = plan_aggregation(&spec, &QueryLimits::default()).unwrap();

        let names: Vec<&str> = plan.select.iter().map(|s| s.output_name()).collect();
        assert_eq!(names, vec!["region", "created_at", "amount_sum"]);
        assert_eq!(plan.group_by, vec![1, 2]);

        let types: Vec<ColumnType> = plan.columns().iter().map(|c| c.column_type).collect();
        assert_eq!(types, vec![ColumnType::Text, ColumnType::Date, ColumnType::Numeric]);
    }

    #[test]
    fn test_count_columns_are_integer() {
        let spec = AggregationSpec::new("sales")
            .with_metric(Metric::new("id", Aggregation::Count))
            .with_metric(Metric::new("id", Aggregation::CountDistinct))
            .with_metric(Metric::new("amount", Aggregation::Max));
        let plan = plan_aggregation(&spec, &QueryLimits::default()).unwrap();
        let types: Vec<ColumnType> = plan.columns().iter().map(|c| c.column_type).collect();
        assert_eq!(types, vec![ColumnType::Integer, ColumnType::Integer, ColumnType::Numeric]);
        assert!(plan.group_by.is_empty());
    }

    #[test]
    fn test_declared_dimension_type() {
        let spec = AggregationSpec::new("t")
            .with_dimension(Dimension::new("is_active").with_type(ColumnType::Boolean));
        let plan = plan_aggregation(&spec, &QueryLimits::default()).unwrap();
        assert_eq!(plan.columns()[0].column_type, ColumnType::Boolean);
    }

    #[test]
    fn test_limit_is_clamped() {
        let limits = QueryLimits::default();
        let plan = plan_aggregation(&sales_spec().with_limit(999_999), &limits).unwrap();
        assert_eq!(plan.limit, 5000);
        let plan = plan_aggregation(&sales_spec().with_limit(0), &limits).unwrap();
        assert_eq!(plan.limit, 1);
        let plan = plan_aggregation(&sales_spec(), &limits).unwrap();
        assert_eq!(plan.limit, 5000);
    }

    #[test]
    fn test_blank_fields_are_missing_params() {
        let spec = AggregationSpec::new("t").with_dimension(Dimension::new("  "));
        let err = plan_aggregation(&spec, &QueryLimits::default()).unwrap_err();
        assert_eq!(err.code().as_str(), "MISSING_PARAMS");

        let spec = AggregationSpec::new("t").with_metric(Metric::new("", Aggregation::Sum));
        let err = plan_aggregation(&spec, &QueryLimits::default()).unwrap_err();
        assert_eq!(err.code().as_str(), "MISSING_PARAMS");
    }

    #[test]
    fn test_wildcard_only_for_count() {
        let ok = AggregationSpec::new("t").with_metric(Metric::new("*", Aggregation::Count));
        assert!(plan_aggregation(&ok, &QueryLimits::default()).is_ok());

        let bad = AggregationSpec::new("t").with_metric(Metric::new("*", Aggregation::Sum));
        let err = plan_aggregation(&bad, &QueryLimits::default()).unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_PARAMS");
    }

    #[test]
    fn test_order_by_resolves_to_output_columns() {
        let spec = sales_spec()
            .with_order_by(OrderBy::desc("amount_sum"))
            .with_order_by(OrderBy::asc("category"));
        let plan = plan_aggregation(&spec, &QueryLimits::default()).unwrap();
        assert_eq!(
            plan.order_by,
            vec![
                SortKey { position: 1, direction: SortDirection::Desc },
                SortKey { position: 0, direction: SortDirection::Asc },
            ]
        );
    }

    #[test]
    fn test_order_by_unknown_field_rejected() {
        let spec = sales_spec().with_order_by(OrderBy::asc("1; DROP TABLE x"));
        let err = plan_aggregation(&spec, &QueryLimits::default()).unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_PARAMS");
    }

    #[test]
    fn test_filters_are_resolved() {
        let spec = sales_spec()
            .with_filter(DataFilter::new("region", serde_json::json!(["A", "B"])))
            .with_filter(DataFilter::new("qty", 2).with_operator("gt"));
        let plan = plan_aggregation(&spec, &QueryLimits::default()).unwrap();
        assert_eq!(plan.filters.len(), 2);

        let bad = sales_spec().with_filter(DataFilter::new("qty", 2).with_operator("between"));
        let err = plan_aggregation(&bad, &QueryLimits::default()).unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_PARAMS");
    }
}
