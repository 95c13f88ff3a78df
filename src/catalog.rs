//! Dataset catalog
//!
//! Datasets are looked up by name through [`DatasetResolver`]. The engine
//! never decides where dataset definitions live; [`DatasetCatalog`] is the
//! YAML-backed implementation and [`TenantCatalog`] scopes it to a caller.

use serde::Deserialize;
use std::sync::Arc;

use crate::error::AggregationError;
use crate::model::Dataset;

/// Dataset-resolution boundary
pub trait DatasetResolver: Send + Sync {
    /// Resolve a dataset reference, enforcing the caller's visibility.
    ///
    /// Unknown names fail with `DATASET_NOT_FOUND`, datasets the caller may
    /// not read with `ACCESS_DENIED`.
    fn resolve(&self, name: &str) -> Result<Dataset, AggregationError>;
}

/// A set of dataset definitions
///
/// ```yaml
/// datasets:
///   - name: orders
///     query: SELECT * FROM orders
///     connection: warehouse
///     tenants: [acme]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetCatalog {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

impl DatasetCatalog {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        Self { datasets }
    }

    /// Get a dataset by name
    pub fn get_dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.name == name)
    }

    /// Names of the datasets `tenant` may read
    pub fn visible_to<'a>(&'a self, tenant: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.datasets
            .iter()
            .filter(move |d| d.is_visible_to(tenant))
            .map(|d| d.name.as_str())
    }

    /// Scope this catalog to one tenant
    pub fn for_tenant(self: &Arc<Self>, tenant: impl Into<String>) -> TenantCatalog {
        TenantCatalog::new(Arc::clone(self), tenant)
    }
}

/// A catalog as seen by one tenant
#[derive(Debug, Clone)]
pub struct TenantCatalog {
    catalog: Arc<DatasetCatalog>,
    tenant: String,
}

impl TenantCatalog {
    pub fn new(catalog: Arc<DatasetCatalog>, tenant: impl Into<String>) -> Self {
        Self {
            catalog,
            tenant: tenant.into(),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }
}

impl DatasetResolver for TenantCatalog {
    fn resolve(&self, name: &str) -> Result<Dataset, AggregationError> {
        let dataset = self
            .catalog
            .get_dataset(name)
            .ok_or_else(|| AggregationError::DatasetNotFound(name.to_string()))?;

        if !dataset.is_visible_to(&self.tenant) {
            return Err(AggregationError::AccessDenied(name.to_string()));
        }

        Ok(dataset.clone())
    }
}
