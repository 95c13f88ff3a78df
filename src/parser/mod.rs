//! Document parser (verb module)
//!
//! Transforms YAML files into configuration and catalog types, and JSON
//! request bodies into aggregation specs.

use std::path::Path;
use serde::de::DeserializeOwned;

use crate::catalog::DatasetCatalog;
use crate::config::EngineConfig;
use crate::error::ParseError;
use crate::query::AggregationSpec;

/// Parse engine configuration from a YAML file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ParseError> {
    parse_yaml_str(&read_file(path)?)
}

/// Parse engine configuration from a YAML string
pub fn parse_config_str(yaml: &str) -> Result<EngineConfig, ParseError> {
    parse_yaml_str(yaml)
}

/// Parse a dataset catalog from a YAML file
pub fn parse_catalog_file<P: AsRef<Path>>(path: P) -> Result<DatasetCatalog, ParseError> {
    parse_yaml_str(&read_file(path)?)
}

/// Parse a dataset catalog from a YAML string
pub fn parse_catalog_str(yaml: &str) -> Result<DatasetCatalog, ParseError> {
    parse_yaml_str(yaml)
}

/// Parse an aggregation request body
pub fn parse_spec_json(json: &str) -> Result<AggregationSpec, ParseError> {
    serde_json::from_str(json).map_err(ParseError::from)
}

fn read_file<P: AsRef<Path>>(path: P) -> Result<String, ParseError> {
    let path_str = path.as_ref().display().to_string();
    std::fs::read_to_string(&path).map_err(|e| ParseError::Io {
        path: path_str,
        source: e,
    })
}

fn parse_yaml_str<T: DeserializeOwned>(yaml: &str) -> Result<T, ParseError> {
    // An empty document is YAML null; treat it as an empty mapping
    if yaml.trim().is_empty() {
        return serde_yaml::from_str("{}").map_err(ParseError::from);
    }
    serde_yaml::from_str(yaml).map_err(ParseError::from)
}
