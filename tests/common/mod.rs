//! Shared test utilities for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chartquery::{
    parser, AggregationError, DatasetCatalog, EngineConfig, ExecutionRequest, RawResult, Row,
    SqlExecutor,
};
use serde_json::Value;

/// Load the dataset catalog fixture
pub fn load_catalog() -> Arc<DatasetCatalog> {
    let catalog = parser::parse_catalog_file("tests/test_data/catalog.yaml")
        .unwrap_or_else(|e| panic!("Failed to load catalog fixture: {}", e));
    Arc::new(catalog)
}

/// Load the engine configuration fixture
pub fn load_config() -> EngineConfig {
    parser::parse_config_file("tests/test_data/config.yaml")
        .unwrap_or_else(|e| panic!("Failed to load config fixture: {}", e))
}

/// Load a raw driver result fixture from tests/test_data
pub fn load_raw(name: &str) -> RawResult {
    let path = format!("tests/test_data/{}", name);
    let contents = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    serde_yaml::from_str(&contents).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e))
}

/// Turn a JSON array of objects into input rows
pub fn rows(value: Value) -> Vec<Row> {
    value
        .as_array()
        .expect("rows fixture must be an array")
        .iter()
        .map(|row| row.as_object().cloned().expect("row must be an object"))
        .collect()
}

// =============================================================================
// Fake SQL executors
// =============================================================================

/// Executor returning a fixed outcome and recording every request
pub struct ScriptedExecutor {
    outcome: Result<RawResult, AggregationError>,
    requests: Mutex<Vec<ExecutionRequest>>,
}

impl ScriptedExecutor {
    pub fn returning(result: RawResult) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(result),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(AggregationError::QueryFailed(message.to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.sql.clone())
    }
}

impl SqlExecutor for ScriptedExecutor {
    fn execute(&self, request: &ExecutionRequest) -> Result<RawResult, AggregationError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}
