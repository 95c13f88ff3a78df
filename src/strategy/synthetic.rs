//! Synthetic demo data strategy
//!
//! Last resort of a chain: invents rows shaped by the requested field names
//! so a chart can still render in demo mode. Output is deterministic for a
//! given spec and row count.

use chrono::{Days, NaiveDate};
use indexmap::IndexSet;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::aggregator::{aggregate_rows, Row};
use crate::config::EngineConfig;
use crate::envelope::ResultEnvelope;
use crate::error::AggregationError;
use crate::infer::{classify_field_name, FieldRole};
use crate::planner::plan_aggregation;
use crate::query::AggregationSpec;
use super::AcquisitionStrategy;

const CATEGORY_LABELS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const DAYS_BETWEEN_ROWS: u64 = 9;

#[derive(Debug, Clone, Default)]
pub struct SyntheticStrategy {
    config: EngineConfig,
}

impl SyntheticStrategy {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl AcquisitionStrategy for SyntheticStrategy {
    fn name(&self) -> &str {
        "synthetic"
    }

    #[instrument(name = "strategy::synthetic::acquire", level = "debug", skip(self, spec), fields(dataset = %spec.dataset))]
    fn acquire(&self, spec: &AggregationSpec) -> Result<ResultEnvelope, AggregationError> {
        let started = Instant::now();
        let plan = plan_aggregation(spec, &self.config.limits)?;
        let rows = synthetic_rows(spec, self.config.synthetic_rows);
        debug!(rows = rows.len(), "generated synthetic rows");

        let mut envelope = aggregate_rows(&plan, &rows);
        let cap = usize::try_from(plan.limit).unwrap_or(usize::MAX);
        envelope.rows.truncate(cap);
        envelope.elapsed_ms = started.elapsed().as_millis() as u64;
        Ok(envelope)
    }
}

/// Generate `count` rows covering every field the request references
pub fn synthetic_rows(spec: &AggregationSpec, count: usize) -> Vec<Row> {
    let fields: IndexSet<&str> = spec
        .dimensions
        .iter()
        .map(|d| d.field.as_str())
        .chain(spec.metrics.iter().map(|m| m.field.as_str()))
        .chain(spec.filters.iter().map(|f| f.field.as_str()))
        .filter(|f| *f != "*")
        .collect();

    (0..count)
        .map(|i| {
            fields
                .iter()
                .map(|field| (field.to_string(), synthetic_value(field, i)))
                .collect()
        })
        .collect()
}

fn synthetic_value(field: &str, i: usize) -> Value {
    let seed = field.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));

    match classify_field_name(field) {
        FieldRole::Measure => Value::from((seed.wrapping_add(i.wrapping_mul(37)) % 900 + 100) as u64),
        FieldRole::Temporal => NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|start| start.checked_add_days(Days::new(i as u64 * DAYS_BETWEEN_ROWS)))
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        FieldRole::Identifier => Value::String(format!("{}-{:04}", field, i + 1)),
        FieldRole::Category => {
            let label = CATEGORY_LABELS[seed.wrapping_add(i) % CATEGORY_LABELS.len()];
            Value::String(label.to_string())
        }
    }
}
