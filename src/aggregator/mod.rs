//! In-memory aggregation engine (verb module)
//!
//! Evaluates an AggregatePlan over already-fetched rows, for when the query
//! cannot be pushed to a database: cached previews, demo data, client-side
//! previews. Produces the same columns as the SQL path; values may differ
//! (e.g. time buckets are `YYYY-MM-DD` strings rather than timestamps).

mod accumulator;
mod engine;
mod predicate;
mod value;

pub use engine::{aggregate_rows, aggregate_sample};
pub use value::{coerce_number, compare_values, truncate_to_grain};

/// A materialized input row: field name to value
pub type Row = serde_json::Map<String, serde_json::Value>;
