//! The assembled identity graph
//!
//! [`IdentityGraph::build`] runs the resolvers in dependency order (types,
//! resources, entitlements) over one [`RecordSet`]. Grants are resolved on
//! demand for a context resource. A graph is meant to live for a single
//! request; nothing here is cached across builds.

use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::entitlements::{build_entitlement_cache, EntitlementCache, EntitlementNode};
use crate::error::GraphResult;
use crate::grants::{GrantEdge, GrantResolver};
use crate::records::{RawGrantRecord, RecordSet};
use crate::resource_types::{resolve_resource_types, ResourceTypeDef, ResourceTypeMap};
use crate::resources::{build_resource_cache, ResourceCache, ResourceId, ResourceNode};

/// Resource types, resources and entitlements built from one record set.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityGraph {
    /// Resource types by id.
    pub resource_types: ResourceTypeMap,
    /// Resources by name.
    pub resources: ResourceCache,
    /// Entitlements by composite key.
    pub entitlements: EntitlementCache,
    /// Row-level findings raised while building and resolving.
    pub diagnostics: Diagnostics,
    #[serde(skip)]
    grants: Vec<RawGrantRecord>,
}

impl IdentityGraph {
    /// Build a graph from a record set.
    ///
    /// # Errors
    ///
    /// Structural failures only: no derivable resource types, or user rows
    /// without a user type. Bad rows are recorded in [`Self::diagnostics`].
    pub fn build(records: &RecordSet) -> GraphResult<Self> {
        let mut diagnostics = Diagnostics::new();

        let resource_types =
            resolve_resource_types(&records.users, &records.resources, &mut diagnostics)?;
        let resources = build_resource_cache(
            &records.users,
            &records.resources,
            &resource_types,
            &mut diagnostics,
        )?;
        let entitlements =
            build_entitlement_cache(&records.entitlements, &resources, &mut diagnostics);

        if !diagnostics.is_empty() {
            tracing::info!(
                warnings = diagnostics.warning_count(),
                errors = diagnostics.error_count(),
                "Skipped or defaulted rows while building identity graph"
            );
        }

        Ok(Self {
            resource_types,
            resources,
            entitlements,
            diagnostics,
            grants: records.grants.clone(),
        })
    }

    /// Look up a resource type by id.
    pub fn resource_type(&self, id: &str) -> Option<&ResourceTypeDef> {
        self.resource_types.get(id)
    }

    /// Resources of one type under `parent`, sorted by name.
    ///
    /// With no parent, only top-level resources (those without a parent)
    /// are returned.
    pub fn resources_of_type(
        &self,
        resource_type: &str,
        parent: Option<&ResourceId>,
    ) -> Vec<&ResourceNode> {
        let mut matching: Vec<_> = self
            .resources
            .iter()
            .filter(|r| r.id.resource_type == resource_type)
            .filter(|r| r.parent.as_ref() == parent)
            .collect();
        matching.sort_by(|a, b| a.id.resource.cmp(&b.id.resource).then_with(|| a.id.cmp(&b.id)));
        matching
    }

    /// Entitlements owned by a resource, sorted by slug.
    pub fn entitlements_for(&self, resource: &ResourceId) -> Vec<&EntitlementNode> {
        self.entitlements.for_resource(resource)
    }

    /// Grant edges relevant to `context`, sorted by principal then
    /// entitlement. Dropped rows are appended to [`Self::diagnostics`].
    pub fn grants_for(&mut self, context: &ResourceId) -> Vec<GrantEdge> {
        let resolver = GrantResolver::new(&self.resource_types, &self.resources, &self.entitlements);
        resolver.resolve(&self.grants, context, &mut self.diagnostics)
    }

    /// A resolver borrowing this graph's caches.
    pub fn grant_resolver(&self) -> GrantResolver<'_> {
        GrantResolver::new(&self.resource_types, &self.resources, &self.entitlements)
    }
}
