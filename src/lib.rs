//! chartquery - Compile chart aggregation requests to SQL or evaluate them in memory
//!
//! This library provides:
//! - Aggregation request types (AggregationSpec, Dimension, Metric, DataFilter)
//! - Request validation and normalization into an AggregatePlan
//! - SQL emission wrapping an opaque dataset query as a derived table
//! - In-memory aggregation over already-fetched rows
//! - Column type inference for untyped driver output
//! - A fallback chain of data acquisition strategies
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - domain concepts (Aggregation, ColumnType, TimeGrain, Dataset)
//! - `query/` - request types (AggregationSpec, DataFilter)
//! - `plan/` - validated plan types (AggregatePlan, SelectItem, Predicate)
//! - `envelope` - the `{columns, rows, truncated, elapsed_ms}` result contract
//! - `catalog` - dataset lookup scoped to a tenant
//! - `config` - limits and engine settings
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → EngineConfig / DatasetCatalog, JSON → AggregationSpec
//! - `planner/` - AggregationSpec → AggregatePlan
//! - `emitter/` - AggregatePlan → SQL
//! - `aggregator/` - AggregatePlan + rows → ResultEnvelope
//! - `infer/` - declared type / sample / field name → ColumnType
//! - `strategy/` - AggregationSpec → ResultEnvelope via live SQL, cached previews or synthetic data
//!
//! # Example
//!
//! ```ignore
//! use chartquery::{compile, Aggregation, AggregationSpec, Dimension, Metric, QueryLimits};
//!
//! let spec = AggregationSpec::new("sales")
//!     .with_dimension(Dimension::new("category"))
//!     .with_metric(Metric::new("amount", Aggregation::Sum))
//!     .with_limit(100);
//! let sql = compile(&spec, "SELECT category, amount FROM sales", &QueryLimits::default())?;
//! ```

pub mod model;
pub mod query;
pub mod plan;
pub mod planner;
pub mod emitter;
pub mod aggregator;
pub mod infer;
pub mod envelope;
pub mod catalog;
pub mod strategy;
pub mod config;
pub mod parser;
pub mod error;

// Re-export commonly used types
pub use model::{Aggregation, ColumnType, Dataset, SortDirection, TimeGrain};
pub use query::{AggregationSpec, DataFilter, Dimension, FilterOperator, Metric, OrderBy};
pub use plan::{AggregatePlan, Predicate, SelectItem, SortKey};
pub use planner::plan_aggregation;
pub use emitter::{emit_preview_sql, emit_sql, ensure_select_only, quote_ident};
pub use aggregator::{aggregate_rows, aggregate_sample, Row};
pub use infer::infer_column_type;
pub use envelope::{RawColumn, RawResult, ResultColumn, ResultEnvelope};
pub use catalog::{DatasetCatalog, DatasetResolver, TenantCatalog};
pub use strategy::{
    Acquisition, AcquisitionStrategy, CachedPreviewStrategy, ExecutionRequest, LiveSqlStrategy,
    SqlExecutor, StrategyChain, SyntheticStrategy,
};
pub use config::{EngineConfig, QueryLimits};
pub use error::{AggregationError, ErrorBody, ErrorCode, ParseError};

/// Compile `spec` into one SQL statement over the dataset query `inner_sql`.
///
/// The inner query must be a single read-only SELECT; it is embedded as a
/// derived table without further changes.
pub fn compile(spec: &AggregationSpec, inner_sql: &str, limits: &QueryLimits) -> Result<String, AggregationError> {
    let inner = ensure_select_only(inner_sql)?;
    let plan = plan_aggregation(spec, limits)?;
    Ok(emit_sql(&plan, inner))
}

/// Compile a raw preview of `inner_sql`, clamped to the preview limits
pub fn compile_preview(inner_sql: &str, limit: Option<u64>, limits: &QueryLimits) -> Result<String, AggregationError> {
    let inner = ensure_select_only(inner_sql)?;
    Ok(emit_preview_sql(inner, limits.clamp_preview(limit)))
}

/// Aggregate already-fetched rows in memory
pub fn aggregate(spec: &AggregationSpec, rows: &[Row], limits: &QueryLimits) -> Result<ResultEnvelope, AggregationError> {
    let plan = plan_aggregation(spec, limits)?;
    Ok(aggregate_rows(&plan, rows))
}
