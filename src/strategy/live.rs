//! Live SQL strategy

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::catalog::DatasetResolver;
use crate::config::EngineConfig;
use crate::emitter::{emit_preview_sql, emit_sql, ensure_select_only};
use crate::envelope::{RawResult, ResultEnvelope};
use crate::error::AggregationError;
use crate::model::Dataset;
use crate::planner::plan_aggregation;
use crate::query::AggregationSpec;
use super::{AcquisitionStrategy, ExecutionRequest, SqlExecutor};

/// Resolve the dataset, compile the request over its defining query and run
/// the statement against the dataset's connection
pub struct LiveSqlStrategy {
    resolver: Arc<dyn DatasetResolver>,
    executor: Arc<dyn SqlExecutor>,
    config: EngineConfig,
}

impl LiveSqlStrategy {
    pub fn new(resolver: Arc<dyn DatasetResolver>, executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            resolver,
            executor,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Fetch raw rows of a dataset, typed by the inferencer.
    ///
    /// The result is what [`super::CachedPreviewStrategy`] later aggregates
    /// when the live path is down.
    #[instrument(name = "strategy::live::preview", level = "debug", skip(self))]
    pub fn preview(&self, dataset: &str, limit: Option<u64>) -> Result<ResultEnvelope, AggregationError> {
        let dataset = self.resolve(dataset)?;
        let inner = ensure_select_only(&dataset.query)?;
        let limit = self.config.limits.clamp_preview(limit);
        let sql = emit_preview_sql(inner, limit);
        debug!(%sql, "compiled preview");

        let started = Instant::now();
        let raw = self.run(&dataset, sql)?;
        ResultEnvelope::from_preview(raw, limit, started.elapsed())
    }

    fn resolve(&self, name: &str) -> Result<Dataset, AggregationError> {
        if name.trim().is_empty() {
            return Err(AggregationError::MissingParams("dataset".to_string()));
        }
        self.resolver.resolve(name)
    }

    fn run(&self, dataset: &Dataset, sql: String) -> Result<RawResult, AggregationError> {
        let connection = dataset.connection.clone().ok_or_else(|| {
            AggregationError::Unavailable(format!("dataset '{}' has no connection", dataset.name))
        })?;

        self.executor.execute(&ExecutionRequest {
            sql,
            connection,
            timeout: self.config.query_timeout(),
        })
    }
}

impl AcquisitionStrategy for LiveSqlStrategy {
    fn name(&self) -> &str {
        "live"
    }

    #[instrument(name = "strategy::live::acquire", level = "debug", skip(self, spec), fields(dataset = %spec.dataset))]
    fn acquire(&self, spec: &AggregationSpec) -> Result<ResultEnvelope, AggregationError> {
        let dataset = self.resolve(&spec.dataset)?;
        let inner = ensure_select_only(&dataset.query)?;
        let plan = plan_aggregation(spec, &self.config.limits)?;
        let sql = emit_sql(&plan, inner);
        debug!(%sql, "compiled aggregation");

        let started = Instant::now();
        let raw = self.run(&dataset, sql)?;
        ResultEnvelope::from_execution(&plan, raw, self.config.strict_row_width, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DatasetCatalog;
    use crate::envelope::RawColumn;
    use crate::error::ErrorCode;
    use crate::model::Aggregation;
    use crate::query::{Dimension, Metric};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        requests: Mutex<Vec<ExecutionRequest>>,
        result: RawResult,
    }

    impl SqlExecutor for RecordingExecutor {
        fn execute(&self, request: &ExecutionRequest) -> Result<RawResult, AggregationError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.result.clone())
        }
    }

    fn strategy(executor: Arc<RecordingExecutor>, query: &str) -> LiveSqlStrategy {
        let catalog = Arc::new(DatasetCatalog::new(vec![
            Dataset::new("sales", query).with_connection("warehouse"),
            Dataset::new("offline", "SELECT 1"),
        ]));
        LiveSqlStrategy::new(Arc::new(catalog.for_tenant("acme")), executor)
    }

    fn spec() -> AggregationSpec {
        AggregationSpec::new("sales")
            .with_dimension(Dimension::new("category"))
            .with_metric(Metric::new("amount", Aggregation::Sum).with_alias("amount_sum"))
            .with_limit(100)
    }

    #[test]
    fn test_acquire_compiles_and_executes() {
        let executor = Arc::new(RecordingExecutor {
            result: RawResult {
                columns: vec![RawColumn::new("category"), RawColumn::new("amount_sum")],
                rows: vec![vec![json!("books"), json!(12.5)]],
            },
            ..Default::default()
        });
        let live = strategy(executor.clone(), "SELECT category, amount FROM sales;");

        let env = live.acquire(&spec()).unwrap();
        assert_eq!(env.rows, vec![vec![json!("books"), json!(12.5)]]);
        assert!(!env.truncated);

        let requests = executor.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].sql,
            r#"SELECT "category", SUM("amount") AS "amount_sum" FROM (SELECT category, amount FROM sales) AS base GROUP BY 1 ORDER BY 1 LIMIT 100"#
        );
        assert_eq!(requests[0].connection, "warehouse");
        assert_eq!(requests[0].timeout, EngineConfig::default().query_timeout());
    }

    #[test]
    fn test_acquire_caps_rows_past_limit() {
        let executor = Arc::new(RecordingExecutor {
            result: RawResult {
                columns: vec![RawColumn::new("category"), RawColumn::new("amount_sum")],
                rows: (0..4).map(|i| vec![json!(format!("c{}", i)), json!(i)]).collect(),
            },
            ..Default::default()
        });
        let live = strategy(executor, "SELECT category, amount FROM sales");

        let env = live.acquire(&spec().with_limit(3)).unwrap();
        assert_eq!(env.rows.len(), 3);
        assert!(env.truncated);
        assert_eq!(env.rows[2], vec![json!("c2"), json!(2)]);
    }

    #[test]
    fn test_acquire_rejects_mutating_query_before_execution() {
        let executor = Arc::new(RecordingExecutor::default());
        let live = strategy(executor.clone(), "SELECT * FROM t; DROP TABLE t;");

        let err = live.acquire(&spec()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::OnlySelectAllowed);
        assert!(executor.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_acquire_without_connection_is_unavailable() {
        let live = strategy(Arc::new(RecordingExecutor::default()), "SELECT 1");
        let mut spec = spec();
        spec.dataset = "offline".to_string();

        let err = live.acquire(&spec).unwrap_err();
        assert!(matches!(err, AggregationError::Unavailable(_)));
        assert!(err.is_fallback_eligible());
    }

    #[test]
    fn test_acquire_requires_dataset() {
        let live = strategy(Arc::new(RecordingExecutor::default()), "SELECT 1");
        let err = live.acquire(&AggregationSpec::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingParams);
    }

    #[test]
    fn test_preview_clamps_limit() {
        let executor = Arc::new(RecordingExecutor {
            result: RawResult {
                columns: vec![RawColumn::typed("amount", "numeric")],
                rows: vec![vec![json!(1.5)]],
            },
            ..Default::default()
        });
        let live = strategy(executor.clone(), "SELECT amount FROM sales");

        let env = live.preview("sales", Some(50_000)).unwrap();
        assert_eq!(env.columns[0].column_type, crate::model::ColumnType::Numeric);
        assert_eq!(
            executor.requests.lock().unwrap()[0].sql,
            "SELECT * FROM (SELECT amount FROM sales) AS base LIMIT 10000"
        );
    }
}
