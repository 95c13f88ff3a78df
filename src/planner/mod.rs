//! Aggregation planner (verb module)
//!
//! Validates an AggregationSpec and normalizes it into an AggregatePlan.

mod build;
mod normalize;

pub use build::plan_aggregation;
