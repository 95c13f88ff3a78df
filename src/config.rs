//! Engine configuration
//!
//! Loaded from YAML through [`crate::parser`]; every field has a default so
//! an empty document yields the stock limits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Row caps applied to compiled queries and in-memory results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryLimits {
    /// Hard cap for grouped/aggregated queries
    pub aggregate_max: u64,
    /// Limit used when an aggregation request does not set one
    pub aggregate_default: u64,
    /// Hard cap for raw preview queries
    pub preview_max: u64,
    /// Limit used when a preview request does not set one
    pub preview_default: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            aggregate_max: 5000,
            aggregate_default: 5000,
            preview_max: 10000,
            preview_default: 1000,
        }
    }
}

impl QueryLimits {
    /// Clamp a requested aggregation limit to `[1, aggregate_max]`
    pub fn clamp_aggregate(&self, requested: Option<u64>) -> u64 {
        clamp(requested.unwrap_or(self.aggregate_default), self.aggregate_max)
    }

    /// Clamp a requested preview limit to `[1, preview_max]`
    pub fn clamp_preview(&self, requested: Option<u64>) -> u64 {
        clamp(requested.unwrap_or(self.preview_default), self.preview_max)
    }
}

fn clamp(value: u64, max: u64) -> u64 {
    value.clamp(1, max.max(1))
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub limits: QueryLimits,
    /// Timeout handed to the SQL executor with every live query
    pub query_timeout_ms: u64,
    /// Number of rows the synthetic strategy generates per request
    pub synthetic_rows: usize,
    /// Reject driver rows whose width differs from the column list
    /// instead of padding/truncating them
    pub strict_row_width: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: QueryLimits::default(),
            query_timeout_ms: 15_000,
            synthetic_rows: 24,
            strict_row_width: true,
        }
    }
}

impl EngineConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
