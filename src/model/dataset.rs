//! Dataset definition

use serde::{Deserialize, Serialize};

/// A named, persisted SQL `SELECT` treated as a virtual table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    /// The dataset's defining query (inner SELECT)
    #[serde(alias = "definingQuery")]
    pub query: String,
    /// Connection the query runs against; datasets without one can only be
    /// served from cached or synthetic rows
    #[serde(default, alias = "connectionRef")]
    pub connection: Option<String>,
    /// Tenants allowed to read this dataset. Empty means unrestricted.
    #[serde(default)]
    pub tenants: Vec<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            connection: None,
            tenants: Vec::new(),
        }
    }

    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn with_tenants(mut self, tenants: Vec<String>) -> Self {
        self.tenants = tenants;
        self
    }

    /// Check whether `tenant` may read this dataset
    pub fn is_visible_to(&self, tenant: &str) -> bool {
        self.tenants.is_empty() || self.tenants.iter().any(|t| t == tenant)
    }
}
