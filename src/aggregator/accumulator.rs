//! Per-group metric accumulators
//!
//! Empty-group policy: `avg`, `min` and `max` over zero rows yield `0`,
//! matching `sum`. This keeps every group's row fully numeric; it is a
//! product decision, not a mathematical one.

use serde_json::Value;
use std::collections::HashSet;

use crate::model::Aggregation;
use super::value::{coerce_number, number_value};

#[derive(Debug, Clone)]
pub struct Accumulator {
    func: Aggregation,
    rows: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    distinct: HashSet<u64>,
}

impl Accumulator {
    pub fn new(func: Aggregation) -> Self {
        Self {
            func,
            rows: 0,
            sum: 0.0,
            min: None,
            max: None,
            distinct: HashSet::new(),
        }
    }

    /// Fold one cell into the accumulator. `None` is a `COUNT(*)` row.
    pub fn update(&mut self, cell: Option<&Value>) {
        self.rows += 1;
        let Some(cell) = cell else {
            return;
        };

        let n = coerce_number(cell);
        match self.func {
            Aggregation::Sum | Aggregation::Avg => self.sum += n,
            Aggregation::Min => self.min = Some(self.min.map_or(n, |m| m.min(n))),
            Aggregation::Max => self.max = Some(self.max.map_or(n, |m| m.max(n))),
            Aggregation::CountDistinct => {
                // -0.0 and 0.0 are one value
                let normalized = if n == 0.0 { 0.0 } else { n };
                self.distinct.insert(normalized.to_bits());
            }
            Aggregation::Count => {}
        }
    }

    pub fn finish(&self) -> Value {
        match self.func {
            Aggregation::Count => Value::from(self.rows),
            Aggregation::CountDistinct => Value::from(self.distinct.len() as u64),
            Aggregation::Sum => number_value(self.sum),
            Aggregation::Avg if self.rows == 0 => number_value(0.0),
            Aggregation::Avg => number_value(self.sum / self.rows as f64),
            Aggregation::Min => number_value(self.min.unwrap_or(0.0)),
            Aggregation::Max => number_value(self.max.unwrap_or(0.0)),
        }
    }
}
