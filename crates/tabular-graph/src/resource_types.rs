//! Resource type resolution
//!
//! Derives the set of resource types from the `resources` rows. Each distinct
//! lowercased type label becomes one [`ResourceTypeDef`]; the first row that
//! names a type decides its trait. A builtin `user` type is registered
//! whenever user rows exist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::{DiagnosticKind, Diagnostics, RecordKind};
use crate::error::{GraphError, GraphResult};
use crate::records::{RawResourceRecord, RawUserRecord};
use crate::traits::ResourceTrait;

/// Id of the builtin type that user rows belong to.
pub const USER_TYPE_ID: &str = "user";

/// A resource type definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeDef {
    /// Lowercased type label.
    pub id: String,
    /// Title-cased type label.
    pub display_name: String,
    /// Capability traits, primary trait first.
    pub traits: Vec<ResourceTrait>,
}

impl ResourceTypeDef {
    /// Create a type with a single trait.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, trait_: ResourceTrait) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            traits: vec![trait_],
        }
    }

    /// The builtin `user` type.
    pub fn user() -> Self {
        Self::new(USER_TYPE_ID, "User", ResourceTrait::User)
    }

    /// The first trait, which decides the payload of resources of this type.
    pub fn primary_trait(&self) -> Option<ResourceTrait> {
        self.traits.first().copied()
    }

    /// Check if this type carries a trait.
    pub fn has_trait(&self, trait_: ResourceTrait) -> bool {
        self.traits.contains(&trait_)
    }

    /// Whether principals of this type are users or apps.
    pub fn is_user_or_app(&self) -> bool {
        self.traits.iter().any(ResourceTrait::is_directly_addressable)
    }
}

/// Resource types keyed by lowercased id, iterated in id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeMap {
    types: BTreeMap<String, ResourceTypeDef>,
}

impl ResourceTypeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a type by label. The label is normalized the same way rows
    /// are, so `"Role"` finds `"role"`.
    pub fn get(&self, label: &str) -> Option<&ResourceTypeDef> {
        self.types.get(&normalize_label(label))
    }

    /// Check whether a type is registered.
    pub fn contains(&self, label: &str) -> bool {
        self.types.contains_key(&normalize_label(label))
    }

    /// Register a type unless its id is already taken.
    ///
    /// # Returns
    ///
    /// `true` if the type was inserted.
    pub fn insert(&mut self, def: ResourceTypeDef) -> bool {
        if self.types.contains_key(&def.id) {
            return false;
        }
        self.types.insert(def.id.clone(), def);
        true
    }

    /// All types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceTypeDef> {
        self.types.values()
    }

    /// Get the count of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Build the resource type map from user and resource rows.
///
/// # Errors
///
/// [`GraphError::NoResourceTypes`] when there are no user rows and no
/// resource row yields a type.
pub fn resolve_resource_types(
    users: &[RawUserRecord],
    resources: &[RawResourceRecord],
    diagnostics: &mut Diagnostics,
) -> GraphResult<ResourceTypeMap> {
    tracing::debug!("Building resource type cache from resource function column");

    let mut types = ResourceTypeMap::new();

    if !users.is_empty() {
        types.insert(ResourceTypeDef::user());
    }

    for (row, record) in resources.iter().enumerate() {
        let id = normalize_label(&record.resource_type);
        if id.is_empty() {
            diagnostics.warn(
                RecordKind::Resource,
                row,
                DiagnosticKind::MissingField,
                "Resource row has an empty resource type, no type defined",
                Some(&record.name),
            );
            continue;
        }
        if id == USER_TYPE_ID || types.contains(&id) {
            continue;
        }

        let trait_ = match ResourceTrait::parse(&record.resource_function) {
            Some(t) => t,
            None => {
                diagnostics.warn(
                    RecordKind::Resource,
                    row,
                    DiagnosticKind::UnrecognizedValue,
                    format!(
                        "Unrecognized resource function for resource type '{id}', defaulting to unspecified"
                    ),
                    Some(&record.resource_function),
                );
                ResourceTrait::Unspecified
            }
        };

        let def = ResourceTypeDef::new(id.clone(), title_case(&id), trait_);
        tracing::debug!(id = %def.id, trait_ = trait_.as_str(), "Defined resource type");
        types.insert(def);
    }

    if types.is_empty() {
        return Err(GraphError::NoResourceTypes);
    }

    tracing::info!(count = types.len(), "Built resource type cache from resource data");
    Ok(types)
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Upper-case the first letter of every word. Any character other than a
/// letter, digit, underscore or apostrophe ends a word.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_' || c == '\'');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(type_: &str, function: &str, name: &str) -> RawResourceRecord {
        RawResourceRecord::new(type_, function, name, name)
    }

    #[test]
    fn test_user_type_registered_when_users_exist() {
        let mut diags = Diagnostics::new();
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let types = resolve_resource_types(&users, &[], &mut diags).unwrap();

        let user = types.get("user").unwrap();
        assert_eq!(user.display_name, "User");
        assert_eq!(user.traits, vec![ResourceTrait::User]);
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_case_variants_collapse_to_one_type() {
        let mut diags = Diagnostics::new();
        let resources = vec![
            resource("Role", "role", "admin"),
            resource("role", "group", "viewer"),
        ];
        let types = resolve_resource_types(&[], &resources, &mut diags).unwrap();

        assert_eq!(types.len(), 1);
        let role = types.get("ROLE").unwrap();
        assert_eq!(role.id, "role");
        assert_eq!(role.display_name, "Role");
        // First row wins; the later "group" function is ignored.
        assert_eq!(role.primary_trait(), Some(ResourceTrait::Role));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_function_degrades_to_unspecified() {
        let mut diags = Diagnostics::new();
        let resources = vec![resource("workspace", "folder", "ws-1")];
        let types = resolve_resource_types(&[], &resources, &mut diags).unwrap();

        assert_eq!(
            types.get("workspace").unwrap().primary_trait(),
            Some(ResourceTrait::Unspecified)
        );
        assert!(diags.has(RecordKind::Resource, 0, DiagnosticKind::UnrecognizedValue));
    }

    #[test]
    fn test_user_label_in_resources_is_skipped() {
        let mut diags = Diagnostics::new();
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let resources = vec![resource("User", "group", "svc")];
        let types = resolve_resource_types(&users, &resources, &mut diags).unwrap();

        assert_eq!(types.get("user").unwrap().primary_trait(), Some(ResourceTrait::User));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_no_types_and_no_users_fails() {
        let mut diags = Diagnostics::new();
        assert_eq!(
            resolve_resource_types(&[], &[], &mut diags),
            Err(GraphError::NoResourceTypes)
        );

        // A "user" resource row alone does not define anything.
        let resources = vec![resource("user", "user", "bob")];
        assert_eq!(
            resolve_resource_types(&[], &resources, &mut diags),
            Err(GraphError::NoResourceTypes)
        );
    }

    #[test]
    fn test_blank_type_label_is_reported() {
        let mut diags = Diagnostics::new();
        let resources = vec![resource("  ", "group", "orphan"), resource("team", "group", "t")];
        let types = resolve_resource_types(&[], &resources, &mut diags).unwrap();

        assert_eq!(types.len(), 1);
        assert!(diags.has(RecordKind::Resource, 0, DiagnosticKind::MissingField));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("team"), "Team");
        assert_eq!(title_case("cost center"), "Cost Center");
        assert_eq!(title_case("service-account"), "Service-Account");
        assert_eq!(title_case("api_key"), "Api_key");
        assert_eq!(title_case("a/b"), "A/B");
        assert_eq!(title_case("ci.cd"), "Ci.Cd");
        assert_eq!(title_case("owner's group"), "Owner's Group");
    }

    #[test]
    fn test_types_iterate_in_id_order() {
        let mut diags = Diagnostics::new();
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let resources = vec![
            resource("workspace", "group", "w"),
            resource("app", "app", "a"),
            resource("role", "role", "r"),
        ];
        let types = resolve_resource_types(&users, &resources, &mut diags).unwrap();
        let ids: Vec<_> = types.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["app", "role", "user", "workspace"]);
    }
}
