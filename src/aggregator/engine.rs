//! Grouping and aggregation over materialized rows

use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::envelope::ResultEnvelope;
use crate::model::SortDirection;
use crate::plan::{AggregatePlan, SelectItem};
use super::accumulator::Accumulator;
use super::predicate::row_matches;
use super::value::{compare_values, key_of, truncate_to_grain};
use super::Row;

struct Group {
    dimension_values: Vec<Value>,
    accumulators: Vec<Accumulator>,
}

impl Group {
    fn new(dimension_values: Vec<Value>, plan: &AggregatePlan) -> Self {
        Self {
            dimension_values,
            accumulators: plan.metrics().map(|m| Accumulator::new(m.func)).collect(),
        }
    }
}

/// Aggregate `rows` in memory.
///
/// Groups keep first-seen order unless the plan orders them. Without
/// dimensions the whole input is one group, so the result always has
/// exactly one row. No limit is applied and `truncated` is false.
pub fn aggregate_rows(plan: &AggregatePlan, rows: &[Row]) -> ResultEnvelope {
    let started = Instant::now();
    let output = evaluate(plan, rows);
    ResultEnvelope::new(plan.columns(), output, None, started.elapsed())
}

/// Aggregate at most `plan.limit` input rows.
///
/// For callers holding a sample of a larger dataset: the input is cut to
/// the limit and `truncated` reports whether the sample was full.
pub fn aggregate_sample(plan: &AggregatePlan, rows: &[Row]) -> ResultEnvelope {
    let started = Instant::now();
    let cap = usize::try_from(plan.limit).unwrap_or(usize::MAX);
    let sample = &rows[..rows.len().min(cap)];
    let output = evaluate(plan, sample);

    let mut envelope = ResultEnvelope::new(plan.columns(), output, None, Duration::ZERO);
    envelope.truncated = rows.len() >= cap;
    envelope.elapsed_ms = started.elapsed().as_millis() as u64;
    envelope
}

fn evaluate(plan: &AggregatePlan, rows: &[Row]) -> Vec<Vec<Value>> {
    let mut groups: IndexMap<Vec<String>, Group> = IndexMap::new();
    if !plan.has_dimensions() {
        groups.insert(Vec::new(), Group::new(Vec::new(), plan));
    }

    let mut matched = 0usize;
    for row in rows.iter().filter(|row| row_matches(&plan.filters, row)) {
        matched += 1;

        let values: Vec<Value> = plan
            .dimensions()
            .map(|d| {
                let raw = row.get(&d.field).cloned().unwrap_or(Value::Null);
                match d.time_grain {
                    Some(grain) => truncate_to_grain(&raw, grain),
                    None => raw,
                }
            })
            .collect();
        let key: Vec<String> = values.iter().map(key_of).collect();

        let group = groups
            .entry(key)
            .or_insert_with(|| Group::new(values, plan));

        for (acc, metric) in group.accumulators.iter_mut().zip(plan.metrics()) {
            if metric.is_wildcard() {
                acc.update(None);
            } else {
                acc.update(Some(row.get(&metric.field).unwrap_or(&Value::Null)));
            }
        }
    }

    debug!(
        input = rows.len(),
        matched,
        groups = groups.len(),
        "aggregated rows in memory"
    );

    let mut output: Vec<Vec<Value>> = groups
        .into_values()
        .map(|group| assemble_row(plan, group))
        .collect();

    if !plan.order_by.is_empty() {
        output.sort_by(|a, b| {
            plan.order_by
                .iter()
                .map(|key| {
                    let ord = compare_values(&a[key.position], &b[key.position]);
                    match key.direction {
                        SortDirection::Asc => ord,
                        SortDirection::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }

    output
}

/// Lay out one group in SELECT-list order
fn assemble_row(plan: &AggregatePlan, group: Group) -> Vec<Value> {
    let mut dimension_values = group.dimension_values.into_iter();
    let mut metric_values = group.accumulators.iter().map(Accumulator::finish);

    plan.select
        .iter()
        .map(|item| match item {
            SelectItem::Dimension(_) => dimension_values.next(),
            SelectItem::Metric(_) => metric_values.next(),
        })
        .map(|value| value.unwrap_or(Value::Null))
        .collect()
}
