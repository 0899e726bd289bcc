//! Grant resolution
//!
//! A grant row links a principal to a target entitlement. The principal
//! column is loosely typed: it names either a resource (a user, an app, a
//! team) or an entitlement, in which case the members of that entitlement
//! are the principal set. The distinction is resolved once per row into a
//! [`PrincipalRef`].
//!
//! Grants are resolved per context resource. A row is relevant when either
//! side of it belongs to the context, so one row shows up both in the
//! principal's listing and in the target resource's listing.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticKind, Diagnostics, RecordKind};
use crate::entitlements::{EntitlementCache, EntitlementNode};
use crate::records::RawGrantRecord;
use crate::resource_types::ResourceTypeMap;
use crate::resources::{ResourceCache, ResourceId};

/// A resolved principal reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrincipalRef {
    /// A directly addressable resource or user.
    Resource {
        /// The principal resource.
        id: ResourceId,
    },
    /// The members of an entitlement.
    EntitlementMembership {
        /// Composite key of the membership entitlement.
        entitlement_id: String,
        /// Resource that owns the membership entitlement.
        resource: ResourceId,
    },
}

impl PrincipalRef {
    /// The resource identity acting as principal.
    pub fn resource_id(&self) -> &ResourceId {
        match self {
            PrincipalRef::Resource { id } => id,
            PrincipalRef::EntitlementMembership { resource, .. } => resource,
        }
    }

    /// The membership entitlement, when the principal resolved through one.
    pub fn membership_entitlement(&self) -> Option<&str> {
        match self {
            PrincipalRef::Resource { .. } => None,
            PrincipalRef::EntitlementMembership { entitlement_id, .. } => {
                Some(entitlement_id.as_str())
            }
        }
    }
}

/// Annotation telling the consumer which entitlements to expand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrantExpansion {
    /// Membership entitlements whose members inherit the grant.
    pub entitlement_ids: Vec<String>,
}

/// A principal holding an entitlement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrantEdge {
    /// `"<entitlementId>:<principalType>:<principalName>"`.
    pub id: String,
    /// The granted entitlement.
    pub entitlement: EntitlementNode,
    /// The principal identity.
    pub principal: ResourceId,
    /// Present when the grant must be expanded through a membership set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expansion: Option<GrantExpansion>,
}

impl GrantEdge {
    /// Create a grant edge.
    pub fn new(entitlement: EntitlementNode, principal: ResourceId) -> Self {
        let id = format!(
            "{}:{}:{}",
            entitlement.id, principal.resource_type, principal.resource
        );
        Self {
            id,
            entitlement,
            principal,
            expansion: None,
        }
    }

    /// Mark the grant as expandable through a membership entitlement.
    pub fn with_expansion(mut self, entitlement_id: impl Into<String>) -> Self {
        self.expansion = Some(GrantExpansion {
            entitlement_ids: vec![entitlement_id.into()],
        });
        self
    }

    /// Whether the consumer should expand this grant transitively.
    pub fn is_expandable(&self) -> bool {
        self.expansion.is_some()
    }
}

/// Resolves grant rows against built caches.
#[derive(Debug, Clone, Copy)]
pub struct GrantResolver<'a> {
    types: &'a ResourceTypeMap,
    resources: &'a ResourceCache,
    entitlements: &'a EntitlementCache,
}

impl<'a> GrantResolver<'a> {
    /// Create a resolver over the given caches.
    pub fn new(
        types: &'a ResourceTypeMap,
        resources: &'a ResourceCache,
        entitlements: &'a EntitlementCache,
    ) -> Self {
        Self {
            types,
            resources,
            entitlements,
        }
    }

    /// Resolve a principal identifier, resources first, then entitlements.
    pub fn principal(&self, identifier: &str) -> Option<PrincipalRef> {
        if let Some(node) = self.resources.get(identifier) {
            return Some(PrincipalRef::Resource {
                id: node.id.clone(),
            });
        }
        self.entitlements
            .get(identifier)
            .map(|ent| PrincipalRef::EntitlementMembership {
                entitlement_id: ent.id.clone(),
                resource: ent.resource.clone(),
            })
    }

    /// Resolve every grant row relevant to `context`.
    ///
    /// Returned edges are sorted by principal id, then entitlement id.
    pub fn resolve(
        &self,
        grants: &[RawGrantRecord],
        context: &ResourceId,
        diagnostics: &mut Diagnostics,
    ) -> Vec<GrantEdge> {
        let mut matching = Vec::new();

        for (row, record) in grants.iter().enumerate() {
            if let Some(edge) = self.resolve_row(row, record, context, diagnostics) {
                matching.push(edge);
            }
        }

        matching.sort_by(|a, b| {
            a.principal
                .cmp(&b.principal)
                .then_with(|| a.entitlement.id.cmp(&b.entitlement.id))
                .then_with(|| a.is_expandable().cmp(&b.is_expandable()))
        });

        tracing::debug!(context = %context, count = matching.len(), "Resolved grants");
        matching
    }

    fn resolve_row(
        &self,
        row: usize,
        record: &RawGrantRecord,
        context: &ResourceId,
        diagnostics: &mut Diagnostics,
    ) -> Option<GrantEdge> {
        let Some(principal) = self.principal(&record.principal) else {
            diagnostics.warn(
                RecordKind::Grant,
                row,
                DiagnosticKind::UnresolvedReference,
                "Skipping grant: principal resource not found",
                Some(&record.principal),
            );
            return None;
        };

        let Some(target) = self.entitlements.get(&record.entitlement_id) else {
            diagnostics.warn(
                RecordKind::Grant,
                row,
                DiagnosticKind::UnresolvedReference,
                "Skipping grant: target entitlement not found",
                Some(&record.entitlement_id),
            );
            return None;
        };

        let principal_id = principal.resource_id();
        if principal_id != context && &target.resource != context {
            return None;
        }

        let mut edge = GrantEdge::new(target.clone(), principal_id.clone());

        if let Some(membership) = principal.membership_entitlement() {
            match self.types.get(&principal_id.resource_type) {
                Some(def) if !def.is_user_or_app() => {
                    edge = edge.with_expansion(membership);
                }
                Some(_) => {}
                None => diagnostics.warn(
                    RecordKind::Grant,
                    row,
                    DiagnosticKind::UnknownResourceType,
                    "Could not find resource type for principal, skipping expansion check",
                    Some(&principal_id.resource_type),
                ),
            }
        }

        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::build_entitlement_cache;
    use crate::records::{RawEntitlementRecord, RawResourceRecord, RawUserRecord};
    use crate::resource_types::resolve_resource_types;
    use crate::resources::build_resource_cache;

    struct Fixture {
        types: ResourceTypeMap,
        resources: ResourceCache,
        entitlements: EntitlementCache,
    }

    impl Fixture {
        fn new() -> Self {
            let mut diags = Diagnostics::new();
            let users = vec![
                RawUserRecord::new("alice", "Alice"),
                RawUserRecord::new("bob", "Bob"),
            ];
            let resources = vec![
                RawResourceRecord::new("team", "group", "eng", "Engineering"),
                RawResourceRecord::new("role", "role", "admin", "Admin"),
                RawResourceRecord::new("app", "app", "crm", "CRM"),
                RawResourceRecord::new("user", "user", "svc", "Service"),
            ];
            let entitlements = vec![
                RawEntitlementRecord::new("eng", "member"),
                RawEntitlementRecord::new("admin", "assigned"),
                RawEntitlementRecord::new("crm", "access"),
                RawEntitlementRecord::new("alice", "delegate"),
            ];
            let types = resolve_resource_types(&users, &resources, &mut diags).unwrap();
            let resources = build_resource_cache(&users, &resources, &types, &mut diags).unwrap();
            let entitlements = build_entitlement_cache(&entitlements, &resources, &mut diags);
            Self {
                types,
                resources,
                entitlements,
            }
        }

        fn resolver(&self) -> GrantResolver<'_> {
            GrantResolver::new(&self.types, &self.resources, &self.entitlements)
        }
    }

    #[test]
    fn test_principal_resolution_prefers_resources() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();

        assert_eq!(
            resolver.principal("alice"),
            Some(PrincipalRef::Resource {
                id: ResourceId::new("user", "alice")
            })
        );
        assert_eq!(
            resolver.principal("eng:member"),
            Some(PrincipalRef::EntitlementMembership {
                entitlement_id: "eng:member".to_string(),
                resource: ResourceId::new("team", "eng"),
            })
        );
        assert_eq!(resolver.principal("nobody"), None);
    }

    #[test]
    fn test_direct_grant_is_not_expandable() {
        let fixture = Fixture::new();
        let mut diags = Diagnostics::new();
        let grants = vec![RawGrantRecord::new("alice", "admin:assigned")];
        let edges = fixture
            .resolver()
            .resolve(&grants, &ResourceId::new("role", "admin"), &mut diags);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].principal, ResourceId::new("user", "alice"));
        assert_eq!(edges[0].entitlement.id, "admin:assigned");
        assert_eq!(edges[0].id, "admin:assigned:user:alice");
        assert!(!edges[0].is_expandable());
    }

    #[test]
    fn test_group_membership_grant_is_expandable() {
        let fixture = Fixture::new();
        let mut diags = Diagnostics::new();
        let grants = vec![RawGrantRecord::new("eng:member", "admin:assigned")];
        let edges = fixture
            .resolver()
            .resolve(&grants, &ResourceId::new("role", "admin"), &mut diags);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].principal, ResourceId::new("team", "eng"));
        assert_eq!(
            edges[0].expansion,
            Some(GrantExpansion {
                entitlement_ids: vec!["eng:member".to_string()]
            })
        );
    }

    #[test]
    fn test_user_or_app_membership_is_not_expandable() {
        let fixture = Fixture::new();
        let mut diags = Diagnostics::new();
        let grants = vec![
            RawGrantRecord::new("alice:delegate", "admin:assigned"),
            RawGrantRecord::new("crm:access", "admin:assigned"),
        ];
        let edges = fixture
            .resolver()
            .resolve(&grants, &ResourceId::new("role", "admin"), &mut diags);

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| !e.is_expandable()));
    }

    #[test]
    fn test_grant_listed_from_both_sides() {
        let fixture = Fixture::new();
        let resolver = fixture.resolver();
        let mut diags = Diagnostics::new();
        let grants = vec![RawGrantRecord::new("alice", "eng:member")];

        let from_principal = resolver.resolve(&grants, &ResourceId::new("user", "alice"), &mut diags);
        let from_target = resolver.resolve(&grants, &ResourceId::new("team", "eng"), &mut diags);
        let unrelated = resolver.resolve(&grants, &ResourceId::new("role", "admin"), &mut diags);

        assert_eq!(from_principal, from_target);
        assert_eq!(from_principal.len(), 1);
        assert!(unrelated.is_empty());
    }

    #[test]
    fn test_dangling_references_are_dropped() {
        let fixture = Fixture::new();
        let mut diags = Diagnostics::new();
        let grants = vec![
            RawGrantRecord::new("ghost", "eng:member"),
            RawGrantRecord::new("alice", "eng:owner"),
        ];
        let edges = fixture
            .resolver()
            .resolve(&grants, &ResourceId::new("team", "eng"), &mut diags);

        assert!(edges.is_empty());
        assert!(diags.has(RecordKind::Grant, 0, DiagnosticKind::UnresolvedReference));
        assert!(diags.has(RecordKind::Grant, 1, DiagnosticKind::UnresolvedReference));
        assert_eq!(diags.warning_count(), 2);
    }

    #[test]
    fn test_edges_sorted_by_principal_then_entitlement() {
        let fixture = Fixture::new();
        let mut diags = Diagnostics::new();
        let grants = vec![
            RawGrantRecord::new("bob", "eng:member"),
            RawGrantRecord::new("svc", "eng:member"),
            RawGrantRecord::new("alice", "eng:member"),
            RawGrantRecord::new("eng:member", "admin:assigned"),
        ];
        let edges = fixture
            .resolver()
            .resolve(&grants, &ResourceId::new("team", "eng"), &mut diags);

        let ids: Vec<_> = edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "admin:assigned:team:eng",
                "eng:member:user:alice",
                "eng:member:user:bob",
                "eng:member:user:svc",
            ]
        );
    }
}
