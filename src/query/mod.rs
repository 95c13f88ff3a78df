//! Query request types (noun module)
//!
//! The aggregation request a chart or ad-hoc query sends: dimensions,
//! metrics, filters, ordering and a row limit over one dataset.

mod filter;
mod request;

pub use filter::{DataFilter, FilterOperator, ParseFilterOperatorError};
pub use request::{AggregationSpec, Dimension, Metric, OrderBy};
