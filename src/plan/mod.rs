//! Plan types (noun module)
//!
//! The validated, normalized form of an aggregation request. Both the SQL
//! emitter and the in-memory aggregator consume the same plan, so their
//! column lists cannot drift apart.

mod expr;
mod node;

pub use expr::Predicate;
pub use node::{AggregatePlan, DimensionItem, MetricItem, SelectItem, SortKey};
