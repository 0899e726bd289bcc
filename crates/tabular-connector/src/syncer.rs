//! Per-type listing
//!
//! A [`ResourceSyncer`] serves the three listing operations for one resource
//! type. Every call loads a fresh snapshot and rebuilds the graph; nothing
//! is kept between calls except the type definition and page size.

use std::sync::Arc;
use tabular_graph::{
    EntitlementNode, GrantEdge, GraphError, IdentityGraph, Page, Paginator, ResourceId,
    ResourceNode, ResourceTypeDef,
};
use tracing::{debug, instrument};

use crate::error::{ConnectorError, ConnectorResult};
use crate::loader::RecordLoader;

/// Lists resources, entitlements and grants for one resource type.
#[derive(Clone)]
pub struct ResourceSyncer {
    resource_type: ResourceTypeDef,
    loader: Arc<dyn RecordLoader>,
    paginator: Paginator,
}

impl ResourceSyncer {
    /// Create a syncer for `resource_type`.
    pub fn new(
        resource_type: ResourceTypeDef,
        loader: Arc<dyn RecordLoader>,
        paginator: Paginator,
    ) -> Self {
        Self {
            resource_type,
            loader,
            paginator,
        }
    }

    /// The type this syncer serves.
    pub fn resource_type(&self) -> &ResourceTypeDef {
        &self.resource_type
    }

    /// List resources of this type under `parent`, sorted by name.
    ///
    /// With `parent` of `None`, only resources without a parent are listed.
    ///
    /// # Errors
    ///
    /// Fails when the record set cannot be loaded, the graph cannot be
    /// built, or `page_token` is invalid.
    #[instrument(skip(self), fields(resource_type = %self.resource_type.id))]
    pub async fn list_resources(
        &self,
        parent: Option<&ResourceId>,
        page_token: &str,
    ) -> ConnectorResult<Page<ResourceNode>> {
        const OP: &str = "list_resources";
        let graph = self.build_graph(OP).await?;

        let resources: Vec<ResourceNode> = graph
            .resources_of_type(&self.resource_type.id, parent)
            .into_iter()
            .cloned()
            .collect();
        debug!(matching = resources.len(), "Listing resources");

        self.page(OP, resources, page_token)
    }

    /// List entitlements owned by `resource`, sorted by slug.
    #[instrument(skip(self), fields(resource_type = %self.resource_type.id))]
    pub async fn list_entitlements(
        &self,
        resource: &ResourceId,
        page_token: &str,
    ) -> ConnectorResult<Page<EntitlementNode>> {
        const OP: &str = "list_entitlements";
        let graph = self.build_graph(OP).await?;

        let entitlements: Vec<EntitlementNode> = graph
            .entitlements_for(resource)
            .into_iter()
            .cloned()
            .collect();
        debug!(matching = entitlements.len(), "Listing entitlements");

        self.page(OP, entitlements, page_token)
    }

    /// List grant edges relevant to `resource`, in either direction.
    ///
    /// A grant is included when its principal is `resource` or its target
    /// entitlement is owned by `resource`.
    #[instrument(skip(self), fields(resource_type = %self.resource_type.id))]
    pub async fn list_grants(
        &self,
        resource: &ResourceId,
        page_token: &str,
    ) -> ConnectorResult<Page<GrantEdge>> {
        const OP: &str = "list_grants";
        let mut graph = self.build_graph(OP).await?;

        let grants = graph.grants_for(resource);
        debug!(
            matching = grants.len(),
            diagnostics = graph.diagnostics.len(),
            "Listing grants"
        );

        self.page(OP, grants, page_token)
    }

    async fn build_graph(&self, operation: &'static str) -> ConnectorResult<IdentityGraph> {
        let records = self.loader.load_records().await?;
        debug!(
            source = self.loader.source_name(),
            rows = records.len(),
            "Loaded record snapshot"
        );
        IdentityGraph::build(&records).map_err(|e| wrap(operation, e))
    }

    fn page<T>(&self, operation: &'static str, items: Vec<T>, token: &str) -> ConnectorResult<Page<T>> {
        self.paginator
            .paginate(items, token)
            .map_err(|e| wrap(operation, e))
    }
}

fn wrap(operation: &'static str, err: GraphError) -> ConnectorError {
    tracing::warn!(operation, error = %err, "Listing call failed");
    ConnectorError::graph(operation, err)
}

impl std::fmt::Debug for ResourceSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceSyncer")
            .field("resource_type", &self.resource_type.id)
            .field("source", &self.loader.source_name())
            .field("page_size", &self.paginator.page_size())
            .finish()
    }
}
