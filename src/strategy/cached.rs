//! Cached preview strategy

use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::aggregator::{aggregate_rows, Row};
use crate::config::QueryLimits;
use crate::envelope::ResultEnvelope;
use crate::error::AggregationError;
use crate::planner::plan_aggregation;
use crate::query::AggregationSpec;
use super::AcquisitionStrategy;

#[derive(Debug, Clone)]
struct CachedPreview {
    rows: Vec<Row>,
    /// The preview hit its own row cap, so it is only a sample
    truncated: bool,
}

/// Aggregate previously fetched preview rows in memory.
///
/// Results carry `truncated = true` whenever the underlying preview was
/// itself cut at the preview cap, since the aggregate then only covers a
/// sample of the dataset.
#[derive(Debug, Clone, Default)]
pub struct CachedPreviewStrategy {
    previews: HashMap<String, CachedPreview>,
    limits: QueryLimits,
}

impl CachedPreviewStrategy {
    pub fn new(limits: QueryLimits) -> Self {
        Self {
            previews: HashMap::new(),
            limits,
        }
    }

    /// Cache raw rows for `dataset`, cut to the preview cap
    pub fn insert_rows(&mut self, dataset: impl Into<String>, mut rows: Vec<Row>) {
        let cap = usize::try_from(self.limits.preview_max).unwrap_or(usize::MAX);
        let truncated = rows.len() >= cap;
        rows.truncate(cap);
        self.previews.insert(dataset.into(), CachedPreview { rows, truncated });
    }

    /// Cache a preview envelope, keyed by its column names
    pub fn insert_preview(&mut self, dataset: impl Into<String>, preview: &ResultEnvelope) {
        let rows = preview
            .rows
            .iter()
            .map(|values| {
                preview
                    .columns
                    .iter()
                    .zip(values)
                    .map(|(column, value)| (column.name.clone(), value.clone()))
                    .collect::<Row>()
            })
            .collect();
        self.previews.insert(
            dataset.into(),
            CachedPreview {
                rows,
                truncated: preview.truncated,
            },
        );
    }

    pub fn with_preview(mut self, dataset: impl Into<String>, preview: &ResultEnvelope) -> Self {
        self.insert_preview(dataset, preview);
        self
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.previews.contains_key(dataset)
    }
}

impl AcquisitionStrategy for CachedPreviewStrategy {
    fn name(&self) -> &str {
        "cached"
    }

    #[instrument(name = "strategy::cached::acquire", level = "debug", skip(self, spec), fields(dataset = %spec.dataset))]
    fn acquire(&self, spec: &AggregationSpec) -> Result<ResultEnvelope, AggregationError> {
        let preview = self.previews.get(&spec.dataset).ok_or_else(|| {
            AggregationError::Unavailable(format!("no cached preview for dataset '{}'", spec.dataset))
        })?;

        let started = Instant::now();
        let plan = plan_aggregation(spec, &self.limits)?;
        let mut envelope = aggregate_rows(&plan, &preview.rows);

        let cap = usize::try_from(plan.limit).unwrap_or(usize::MAX);
        let capped = envelope.rows.len() >= cap;
        envelope.rows.truncate(cap);
        envelope.truncated = preview.truncated || capped;
        envelope.elapsed_ms = started.elapsed().as_millis() as u64;

        debug!(
            preview_rows = preview.rows.len(),
            rows = envelope.rows.len(),
            truncated = envelope.truncated,
            "aggregated cached preview"
        );
        Ok(envelope)
    }
}
