//! Model types (nouns)
//!
//! Enumerations shared across the compiler and the in-memory engine, plus
//! the dataset definition.

mod dataset;
mod types;

pub use dataset::Dataset;
pub use types::{Aggregation, ColumnType, SortDirection, TimeGrain, ParseAggregationError, ParseColumnTypeError};
