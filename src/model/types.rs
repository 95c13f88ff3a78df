//! Type definitions shared by the compiler and the in-memory engine

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ColumnType
// ============================================================================

/// Semantic type of a result column, as consumed by chart renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnType {
    /// Free text or opaque identifiers
    #[default]
    Text,
    /// Whole numbers (counts, integer columns)
    Integer,
    /// Any other number
    Numeric,
    /// Dates and timestamps
    Date,
    /// true / false
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Check if this is a numeric type (integer or numeric)
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a column type string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown column type '{input}'. Valid options: text, integer, numeric, date, boolean")]
pub struct ParseColumnTypeError {
    pub input: String,
}

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "string" | "varchar" => Ok(ColumnType::Text),
            "integer" | "int" => Ok(ColumnType::Integer),
            "numeric" | "number" | "decimal" | "float" => Ok(ColumnType::Numeric),
            "date" | "timestamp" | "datetime" => Ok(ColumnType::Date),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            _ => Err(ParseColumnTypeError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ColumnType::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregation functions for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregation {
    /// Sum of values
    #[default]
    Sum,
    /// Average of values
    Avg,
    /// Count of rows
    Count,
    /// Count of distinct values
    CountDistinct,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl Aggregation {
    /// Uppercased SQL function name. `CountDistinct` shares `COUNT` and
    /// adds `DISTINCT` inside the call.
    pub fn sql_function(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Avg => "AVG",
            Aggregation::Count | Aggregation::CountDistinct => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }

    /// Column type of the aggregate's output
    pub fn result_type(&self) -> ColumnType {
        match self {
            Aggregation::Count | Aggregation::CountDistinct => ColumnType::Integer,
            _ => ColumnType::Numeric,
        }
    }

    /// Whether the aggregate may be applied to `*` (all columns)
    pub fn accepts_wildcard(&self) -> bool {
        matches!(self, Aggregation::Count)
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
            Aggregation::Avg => write!(f, "avg"),
            Aggregation::Count => write!(f, "count"),
            Aggregation::CountDistinct => write!(f, "count_distinct"),
            Aggregation::Min => write!(f, "min"),
            Aggregation::Max => write!(f, "max"),
        }
    }
}

/// Error when parsing an aggregation string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown aggregation '{input}'. Valid options: sum, avg, count, count_distinct, min, max")]
pub struct ParseAggregationError {
    pub input: String,
}

impl FromStr for Aggregation {
    type Err = ParseAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "avg" | "average" => Ok(Aggregation::Avg),
            "count" => Ok(Aggregation::Count),
            "count_distinct" | "countdistinct" | "distinct_count" | "distinctcount" => Ok(Aggregation::CountDistinct),
            "min" | "minimum" => Ok(Aggregation::Min),
            "max" | "maximum" => Ok(Aggregation::Max),
            _ => Err(ParseAggregationError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Aggregation::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Aggregation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// ============================================================================
// TimeGrain
// ============================================================================

/// Bucket size for time dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    Day,
    Month,
    Year,
}

impl TimeGrain {
    /// Unit name understood by `DATE_TRUNC`
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGrain::Day => "day",
            TimeGrain::Month => "month",
            TimeGrain::Year => "year",
        }
    }
}

impl fmt::Display for TimeGrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SortDirection
// ============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}
