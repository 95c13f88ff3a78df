//! Error types for chartquery

use serde::Serialize;
use std::fmt;

/// Stable error codes surfaced to callers. The UI branches on these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoFields,
    OnlySelectAllowed,
    DatasetNotFound,
    QueryFailed,
    AccessDenied,
    MissingParams,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoFields => "NO_FIELDS",
            ErrorCode::OnlySelectAllowed => "ONLY_SELECT_ALLOWED",
            ErrorCode::DatasetNotFound => "DATASET_NOT_FOUND",
            ErrorCode::QueryFailed => "QUERY_FAILED",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::MissingParams => "MISSING_PARAMS",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while validating, compiling or acquiring an aggregation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    /// Spec has neither dimensions nor metrics
    #[error("Aggregation must request at least one dimension or metric")]
    NoFields,

    /// Dataset query is not a single read-only SELECT
    #[error("Only a single SELECT statement is allowed: {reason}")]
    OnlySelectAllowed { reason: String },

    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    #[error("Access to dataset '{0}' denied")]
    AccessDenied(String),

    /// The database rejected or failed the compiled query
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A required field of the request is absent or empty
    #[error("Missing parameter: {0}")]
    MissingParams(String),

    /// A field of the request is present but not usable
    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    /// A strategy has no data source for the requested dataset
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AggregationError {
    pub fn only_select(reason: impl Into<String>) -> Self {
        AggregationError::OnlySelectAllowed { reason: reason.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AggregationError::NoFields => ErrorCode::NoFields,
            AggregationError::OnlySelectAllowed { .. } => ErrorCode::OnlySelectAllowed,
            AggregationError::DatasetNotFound(_) => ErrorCode::DatasetNotFound,
            AggregationError::AccessDenied(_) => ErrorCode::AccessDenied,
            AggregationError::QueryFailed(_) | AggregationError::Unavailable(_) => ErrorCode::QueryFailed,
            AggregationError::MissingParams(_) => ErrorCode::MissingParams,
            AggregationError::InvalidParams(_) => ErrorCode::InvalidParams,
            AggregationError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show an end user. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AggregationError::Internal(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether a strategy chain may move on to the next strategy.
    ///
    /// Only execution-class failures qualify; a malformed or unauthorized
    /// request fails the same way everywhere.
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, AggregationError::QueryFailed(_) | AggregationError::Unavailable(_))
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.public_message(),
        }
    }
}

/// Serializable error payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// Errors that can occur while loading configuration, catalogs or requests
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON deserialization error
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    /// Malformed request bodies are `INVALID_PARAMS`, file and YAML errors
    /// are internal
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::Json(_) => ErrorCode::InvalidParams,
            ParseError::Io { .. } | ParseError::Yaml(_) => ErrorCode::InternalError,
        }
    }
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io {
            path: String::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_strings() {
        assert_eq!(AggregationError::NoFields.code().as_str(), "NO_FIELDS");
        assert_eq!(AggregationError::only_select("x").code().as_str(), "ONLY_SELECT_ALLOWED");
        assert_eq!(AggregationError::DatasetNotFound("d".into()).code().as_str(), "DATASET_NOT_FOUND");
        assert_eq!(AggregationError::AccessDenied("d".into()).code().as_str(), "ACCESS_DENIED");
        assert_eq!(AggregationError::QueryFailed("boom".into()).code().as_str(), "QUERY_FAILED");
        assert_eq!(AggregationError::Unavailable("none".into()).code().as_str(), "QUERY_FAILED");
        assert_eq!(AggregationError::MissingParams("field".into()).code().as_str(), "MISSING_PARAMS");
        assert_eq!(AggregationError::Internal("oops".into()).code().as_str(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_code_serializes_like_as_str() {
        for code in [ErrorCode::NoFields, ErrorCode::OnlySelectAllowed, ErrorCode::InternalError] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_internal_message_is_not_exposed() {
        let err = AggregationError::Internal("index out of bounds at src/lib.rs".into());
        let body = err.to_body();
        assert_eq!(body.code, ErrorCode::InternalError);
        assert!(!body.message.contains("src/lib.rs"));
    }

    #[test]
    fn test_fallback_eligibility() {
        assert!(AggregationError::QueryFailed("timeout".into()).is_fallback_eligible());
        assert!(AggregationError::Unavailable("no sample".into()).is_fallback_eligible());
        assert!(!AggregationError::NoFields.is_fallback_eligible());
        assert!(!AggregationError::only_select("drop").is_fallback_eligible());
        assert!(!AggregationError::AccessDenied("d".into()).is_fallback_eligible());
        assert!(!AggregationError::Internal("x".into()).is_fallback_eligible());
    }
}
