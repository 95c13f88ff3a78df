//! Result envelope
//!
//! The `{columns, rows, truncated, elapsed_ms}` contract shared by the SQL
//! path and the in-memory path. Chart renderers only ever see this shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::AggregationError;
use crate::infer::infer_column_type;
use crate::model::ColumnType;
use crate::plan::AggregatePlan;

/// A typed output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Output of an aggregation, whichever path produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Vec<Value>>,
    /// True when the row count reached the applied limit. A heuristic: it
    /// cannot tell "exactly N rows" from "more than N rows".
    pub truncated: bool,
    pub elapsed_ms: u64,
}

impl ResultEnvelope {
    /// Assemble an envelope; `limit` is the limit that was applied, if any
    pub fn new(columns: Vec<ResultColumn>, rows: Vec<Vec<Value>>, limit: Option<u64>, elapsed: Duration) -> Self {
        let truncated = limit.is_some_and(|limit| rows.len() as u64 >= limit);
        Self {
            columns,
            rows,
            truncated,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column index by output name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Build the envelope for a compiled aggregation from raw driver output.
    ///
    /// Columns come from the plan, so the SQL path and the in-memory path
    /// describe results identically. The row cap is applied again here even
    /// though the SQL already carries a LIMIT.
    pub fn from_execution(
        plan: &AggregatePlan,
        raw: RawResult,
        strict_width: bool,
        elapsed: Duration,
    ) -> Result<Self, AggregationError> {
        let columns = plan.columns();
        if strict_width && !raw.columns.is_empty() && raw.columns.len() != columns.len() {
            return Err(AggregationError::Internal(format!(
                "driver returned {} columns, plan expects {}",
                raw.columns.len(),
                columns.len()
            )));
        }

        let rows = shape_rows(raw.rows, columns.len(), plan.limit, strict_width)?;
        Ok(Self::new(columns, rows, Some(plan.limit), elapsed))
    }

    /// Build the envelope for a raw preview query, typing each column with
    /// the inferencer from its declared type and first non-null value.
    pub fn from_preview(raw: RawResult, limit: u64, elapsed: Duration) -> Result<Self, AggregationError> {
        let width = raw.columns.len();
        let rows = shape_rows(raw.rows, width, limit, true)?;

        let columns = raw
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let sample = rows.iter().map(|row| &row[i]).find(|v| !v.is_null());
                ResultColumn::new(
                    col.name.clone(),
                    infer_column_type(col.declared_type.as_deref(), sample, &col.name),
                )
            })
            .collect();

        Ok(Self::new(columns, rows, Some(limit), elapsed))
    }
}

/// Cap rows at `limit` and enforce `row.len() == width`
fn shape_rows(
    mut rows: Vec<Vec<Value>>,
    width: usize,
    limit: u64,
    strict_width: bool,
) -> Result<Vec<Vec<Value>>, AggregationError> {
    let cap = usize::try_from(limit).unwrap_or(usize::MAX);
    rows.truncate(cap);

    for (i, row) in rows.iter_mut().enumerate() {
        if row.len() == width {
            continue;
        }
        if strict_width {
            return Err(AggregationError::Internal(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                width
            )));
        }
        row.resize(width, Value::Null);
    }

    Ok(rows)
}

/// Column description as returned by a database driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    /// Source database type name, when the driver reports one
    #[serde(default, rename = "type")]
    pub declared_type: Option<String>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: Some(declared_type.into()),
        }
    }
}

/// Untyped result of SQL execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}
