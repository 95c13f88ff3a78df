//! Property tests for the aggregation core
//!
//! Column shape, row width, compile determinism and grouping invariants over
//! generated specs and rows.

use std::collections::HashSet;

use chartquery::{
    aggregate, compile, plan_aggregation, Aggregation, AggregationSpec, Dimension, Metric,
    QueryLimits, Row,
};
use proptest::prelude::*;
use serde_json::{json, Value};

const FIELDS: [&str; 4] = ["a", "b", "c", "d"];
const INNER: &str = "SELECT a, b, c, d FROM t";

fn arb_field() -> impl Strategy<Value = String> {
    prop::sample::select(FIELDS.to_vec()).prop_map(str::to_string)
}

fn arb_aggregation() -> impl Strategy<Value = Aggregation> {
    prop_oneof![
        Just(Aggregation::Sum),
        Just(Aggregation::Avg),
        Just(Aggregation::Min),
        Just(Aggregation::Max),
        Just(Aggregation::Count),
        Just(Aggregation::CountDistinct),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-5i64..5).prop_map(|n| json!(n)),
        (-50.0f64..50.0).prop_map(|n| json!(n)),
        prop::sample::select(vec!["x", "y", "z", "12", "1.5", ""]).prop_map(|s| json!(s)),
        any::<bool>().prop_map(|b| json!(b)),
        Just(Value::Null),
    ]
}

fn arb_row() -> impl Strategy<Value = Row> {
    prop::collection::vec((arb_field(), arb_value()), 0..5)
        .prop_map(|pairs| pairs.into_iter().collect())
}

fn arb_spec() -> impl Strategy<Value = AggregationSpec> {
    (
        prop::collection::vec(arb_field(), 0..3),
        prop::collection::vec((arb_field(), arb_aggregation()), 0..4),
        prop::option::of(0u64..20_000),
    )
        .prop_filter("at least one field", |(dims, metrics, _)| dims.len() + metrics.len() >= 1)
        .prop_map(|(dims, metrics, limit)| {
            let mut spec = AggregationSpec::new("t");
            spec.dimensions = dims.into_iter().map(Dimension::new).collect();
            spec.metrics = metrics.into_iter().map(|(f, agg)| Metric::new(f, agg)).collect();
            spec.limit = limit;
            spec
        })
}

/// Numbers compare by value, so `1` and `1.0` land in one group
fn tuple_key(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("n:{}", n.as_f64().unwrap_or(0.0)),
        other => other.to_string(),
    }
}

proptest! {
    #[test]
    fn columns_follow_dimensions_then_metrics(spec in arb_spec(), rows in prop::collection::vec(arb_row(), 0..20)) {
        let limits = QueryLimits::default();
        let plan = plan_aggregation(&spec, &limits).unwrap();
        let env = aggregate(&spec, &rows, &limits).unwrap();

        prop_assert_eq!(plan.columns().len(), spec.dimensions.len() + spec.metrics.len());
        prop_assert_eq!(&env.columns, &plan.columns());
        for row in &env.rows {
            prop_assert_eq!(row.len(), env.columns.len());
        }
    }

    #[test]
    fn compile_is_deterministic_and_clamped(spec in arb_spec()) {
        let limits = QueryLimits::default();
        let first = compile(&spec, INNER, &limits).unwrap();
        let second = compile(&spec, INNER, &limits).unwrap();
        prop_assert_eq!(&first, &second);

        let expected = limits.clamp_aggregate(spec.limit);
        prop_assert!(expected >= 1 && expected <= limits.aggregate_max);
        let limit_clause = format!(" LIMIT {}", expected);
        prop_assert!(first.ends_with(&limit_clause));
        prop_assert!(!first.ends_with(';'));
    }

    #[test]
    fn count_distinct_never_exceeds_count(
        dims in prop::collection::vec(arb_field(), 0..2),
        field in arb_field(),
        rows in prop::collection::vec(arb_row(), 0..30),
    ) {
        let mut spec = AggregationSpec::new("t")
            .with_metric(Metric::new(field.clone(), Aggregation::Count).with_alias("n"))
            .with_metric(Metric::new(field, Aggregation::CountDistinct).with_alias("nd"));
        spec.dimensions = dims.into_iter().map(Dimension::new).collect();
        let width = spec.dimensions.len();

        let env = aggregate(&spec, &rows, &QueryLimits::default()).unwrap();

        for row in &env.rows {
            let count = row[width].as_u64().unwrap();
            let distinct = row[width + 1].as_u64().unwrap();
            prop_assert!(distinct <= count);
        }
    }

    #[test]
    fn group_count_matches_distinct_tuples(
        dims in prop::collection::vec(arb_field(), 1..3),
        rows in prop::collection::vec(arb_row(), 0..30),
    ) {
        let mut spec = AggregationSpec::new("t").with_metric(Metric::new("*", Aggregation::Count));
        spec.dimensions = dims.iter().cloned().map(Dimension::new).collect();

        let env = aggregate(&spec, &rows, &QueryLimits::default()).unwrap();

        let tuples: HashSet<Vec<String>> = rows
            .iter()
            .map(|row| {
                dims.iter()
                    .map(|d| tuple_key(row.get(d).unwrap_or(&Value::Null)))
                    .collect()
            })
            .collect();
        prop_assert_eq!(env.rows.len(), tuples.len());

        let total: u64 = env.rows.iter().map(|r| r[dims.len()].as_u64().unwrap()).sum();
        prop_assert_eq!(total as usize, rows.len());
    }
}
