//! Connector entry point
//!
//! [`TabularConnector`] reports metadata, validates that the source yields
//! a usable graph, and hands out one [`ResourceSyncer`] per resource type.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tabular_graph::resource_types::resolve_resource_types;
use tabular_graph::{Diagnostics, Paginator, ResourceTypeMap};
use tracing::{info, instrument};

use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, ConnectorResult};
use crate::loader::RecordLoader;
use crate::syncer::ResourceSyncer;

/// Connector metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorMetadata {
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
}

/// Connector over a tabular record source.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tabular_connector::{ConnectorConfig, MemoryRecordLoader, TabularConnector};
/// use tabular_graph::RecordSet;
///
/// # async fn example() -> tabular_connector::ConnectorResult<()> {
/// let loader = Arc::new(MemoryRecordLoader::new(RecordSet::new()));
/// let connector = TabularConnector::new(loader, ConnectorConfig::default())?;
///
/// for syncer in connector.resource_syncers().await? {
///     let page = syncer.list_resources(None, "").await?;
///     println!("{}: {} resources", syncer.resource_type().id, page.items.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct TabularConnector {
    loader: Arc<dyn RecordLoader>,
    config: ConnectorConfig,
}

impl TabularConnector {
    /// Create a connector.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Config`] when `config` is invalid.
    pub fn new(loader: Arc<dyn RecordLoader>, config: ConnectorConfig) -> ConnectorResult<Self> {
        config.validate()?;
        Ok(Self { loader, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Connector metadata from configuration.
    pub fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: self.config.display_name.clone(),
            description: self.config.description.clone(),
        }
    }

    /// Load the source once and check that resource types can be derived.
    #[instrument(skip(self), fields(source = self.loader.source_name()))]
    pub async fn validate(&self) -> ConnectorResult<()> {
        let types = self.resolve_types("validate").await?;
        info!(resource_types = types.len(), "Record source validated");
        Ok(())
    }

    /// One syncer per resource type in the current snapshot, ordered by
    /// type id.
    #[instrument(skip(self))]
    pub async fn resource_syncers(&self) -> ConnectorResult<Vec<ResourceSyncer>> {
        let types = self.resolve_types("resource_syncers").await?;
        let paginator = Paginator::new(self.config.page_size);

        Ok(types
            .iter()
            .cloned()
            .map(|def| ResourceSyncer::new(def, Arc::clone(&self.loader), paginator))
            .collect())
    }

    /// The syncer for one resource type.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::UnknownResourceType`] when the current snapshot has
    /// no such type.
    #[instrument(skip(self))]
    pub async fn syncer(&self, type_id: &str) -> ConnectorResult<ResourceSyncer> {
        let types = self.resolve_types("syncer").await?;
        let def = types
            .get(type_id)
            .cloned()
            .ok_or_else(|| ConnectorError::UnknownResourceType(type_id.to_string()))?;

        Ok(ResourceSyncer::new(
            def,
            Arc::clone(&self.loader),
            Paginator::new(self.config.page_size),
        ))
    }

    async fn resolve_types(&self, operation: &'static str) -> ConnectorResult<ResourceTypeMap> {
        let records = self.loader.load_records().await?;
        let mut diagnostics = Diagnostics::new();
        resolve_resource_types(&records.users, &records.resources, &mut diagnostics)
            .map_err(|e| ConnectorError::graph(operation, e))
    }
}

impl std::fmt::Debug for TabularConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularConnector")
            .field("source", &self.loader.source_name())
            .field("config", &self.config)
            .finish()
    }
}
