//! Entitlement construction
//!
//! Entitlements are permissions defined on one resource and addressed by the
//! composite key `"<resourceName>:<slug>"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::{DiagnosticKind, Diagnostics, RecordKind};
use crate::records::RawEntitlementRecord;
use crate::resources::{ResourceCache, ResourceId};

/// How an entitlement is granted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementPurpose {
    /// Granted by direct assignment.
    #[default]
    Assignment,
}

/// A permission scoped to a single resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitlementNode {
    /// Composite key, `"<resourceName>:<slug>"`.
    pub id: String,
    /// Slug, unique within the owning resource.
    pub slug: String,
    /// Human readable name.
    pub display_name: String,
    /// Free text description.
    pub description: String,
    /// Owning resource.
    pub resource: ResourceId,
    /// How the entitlement is granted.
    pub purpose: EntitlementPurpose,
}

/// Build the composite key for an entitlement.
///
/// # Example
///
/// ```
/// use tabular_graph::entitlements::entitlement_key;
///
/// assert_eq!(entitlement_key("team-a", "admin"), "team-a:admin");
/// ```
pub fn entitlement_key(resource_name: &str, slug: &str) -> String {
    format!("{resource_name}:{slug}")
}

/// Entitlements keyed by composite key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitlementCache {
    by_key: BTreeMap<String, EntitlementNode>,
}

impl EntitlementCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entitlement by composite key.
    pub fn get(&self, key: &str) -> Option<&EntitlementNode> {
        self.by_key.get(key)
    }

    /// Check whether a key is taken.
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Entitlements owned by a resource, sorted by slug.
    pub fn for_resource(&self, resource: &ResourceId) -> Vec<&EntitlementNode> {
        let mut matching: Vec<_> = self
            .by_key
            .values()
            .filter(|e| &e.resource == resource)
            .collect();
        matching.sort_by(|a, b| a.slug.cmp(&b.slug).then_with(|| a.id.cmp(&b.id)));
        matching
    }

    /// All entitlements in key order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitlementNode> {
        self.by_key.values()
    }

    /// Get the count of entitlements.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Build the entitlement cache from entitlement rows.
pub fn build_entitlement_cache(
    entitlements: &[RawEntitlementRecord],
    resources: &ResourceCache,
    diagnostics: &mut Diagnostics,
) -> EntitlementCache {
    let mut cache = EntitlementCache::new();

    for (row, record) in entitlements.iter().enumerate() {
        let resource_name = record.resource_name.as_str();
        let slug = record.slug.as_str();

        if resource_name.trim().is_empty() {
            diagnostics.warn(
                RecordKind::Entitlement,
                row,
                DiagnosticKind::MissingField,
                "Skipping entitlement entry with empty resource_name",
                None,
            );
            continue;
        }
        if slug.trim().is_empty() {
            diagnostics.warn(
                RecordKind::Entitlement,
                row,
                DiagnosticKind::MissingField,
                "Skipping entitlement entry with empty entitlement (slug)",
                Some(resource_name),
            );
            continue;
        }

        let key = entitlement_key(resource_name, slug);
        if cache.contains(&key) {
            diagnostics.error(
                RecordKind::Entitlement,
                row,
                DiagnosticKind::Duplicate,
                "Duplicate entitlement key found (resource_name:entitlement)",
                Some(&key),
            );
            continue;
        }

        let Some(owner) = resources.get(resource_name) else {
            diagnostics.error(
                RecordKind::Entitlement,
                row,
                DiagnosticKind::UnresolvedReference,
                format!("Parent resource for entitlement '{key}' not found in resource cache"),
                Some(resource_name),
            );
            continue;
        };

        cache.by_key.insert(
            key.clone(),
            EntitlementNode {
                id: key,
                slug: slug.to_string(),
                display_name: record.display_name.clone(),
                description: record.description.clone(),
                resource: owner.id.clone(),
                purpose: EntitlementPurpose::Assignment,
            },
        );
    }

    tracing::info!(count = cache.len(), "Built entitlement cache");
    cache
}
