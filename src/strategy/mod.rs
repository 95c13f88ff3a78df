//! Data acquisition (verb module)
//!
//! A chart asks for an [`AggregationSpec`]; an ordered [`StrategyChain`]
//! decides where the rows come from:
//!
//! - `live`: compile to SQL and run it through a [`SqlExecutor`]
//! - `cached`: aggregate previously fetched preview rows in memory
//! - `synthetic`: aggregate generated demo rows in memory
//!
//! Falling back is an explicit, caller-visible decision: every strategy
//! returns a typed success or a typed error, and the chain reports which
//! strategy served the request.

mod cached;
mod chain;
mod live;
mod synthetic;

use std::time::Duration;

use crate::envelope::{RawResult, ResultEnvelope};
use crate::error::AggregationError;
use crate::query::AggregationSpec;

pub use cached::CachedPreviewStrategy;
pub use chain::{Acquisition, StrategyChain};
pub use live::LiveSqlStrategy;
pub use synthetic::{synthetic_rows, SyntheticStrategy};

/// A compiled statement handed to the database boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub sql: String,
    pub connection: String,
    pub timeout: Duration,
}

/// SQL execution boundary
///
/// Implementations own pooling, credentials and the timeout. A failed or
/// timed-out statement should surface as [`AggregationError::QueryFailed`].
pub trait SqlExecutor: Send + Sync {
    fn execute(&self, request: &ExecutionRequest) -> Result<RawResult, AggregationError>;
}

/// One way of producing a result envelope for a spec
pub trait AcquisitionStrategy: Send + Sync {
    /// Stable name reported with every served result
    fn name(&self) -> &str;

    fn acquire(&self, spec: &AggregationSpec) -> Result<ResultEnvelope, AggregationError>;
}
