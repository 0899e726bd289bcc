//! Resource graph construction
//!
//! Materializes user rows and resource rows into [`ResourceNode`]s keyed by
//! name, then links children to parents. Users and resources share a single
//! namespace: the first row to claim a name keeps it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::diagnostics::{DiagnosticKind, Diagnostics, RecordKind};
use crate::error::{GraphError, GraphResult};
use crate::records::{RawResourceRecord, RawUserRecord};
use crate::resource_types::{ResourceTypeDef, ResourceTypeMap, USER_TYPE_ID};
use crate::traits::ResourceTrait;

/// Accepted last-login layout.
pub const LAST_LOGIN_FORMAT: &str = "%m/%d/%Y";

/// Identity of a resource: its type id plus its name.
///
/// Ordering is by type, then name, which gives grant listings a total order
/// on principals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId {
    /// Resource type id.
    pub resource_type: String,
    /// Resource name.
    pub resource: String,
}

impl ResourceId {
    /// Create a resource id.
    pub fn new(resource_type: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource)
    }
}

/// Account status of a user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Account can sign in.
    #[default]
    Enabled,
    /// Account is disabled, inactive or suspended.
    Disabled,
}

impl UserStatus {
    /// Parse a status column value (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "enabled" | "active" => Some(UserStatus::Enabled),
            "disabled" | "inactive" | "suspended" => Some(UserStatus::Disabled),
            _ => None,
        }
    }
}

/// Kind of account behind a user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// A person.
    #[default]
    Human,
    /// A service, bot or machine account.
    Service,
}

impl AccountType {
    /// Parse an account type column value (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "service" | "system" | "bot" | "machine" => Some(AccountType::Service),
            "human" | "user" | "person" => Some(AccountType::Human),
            _ => None,
        }
    }
}

/// User-specific payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserTrait {
    /// Primary email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// Account type.
    pub account_type: AccountType,
    /// Date of the last login, if known and parseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<NaiveDate>,
    /// Free-form profile attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profile: BTreeMap<String, Value>,
}

/// Trait-specific payload of a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "trait", rename_all = "snake_case")]
pub enum TraitPayload {
    /// Users and user-trait resources.
    User(UserTrait),
    /// Group resources.
    Group,
    /// Role resources.
    Role,
    /// App resources.
    App,
    /// Secret resources.
    Secret,
    /// Resources whose type has no recognized trait.
    Unspecified,
}

impl TraitPayload {
    /// Empty payload for a resource of the given type.
    pub fn for_type(def: &ResourceTypeDef) -> Self {
        match def.primary_trait() {
            Some(ResourceTrait::User) => TraitPayload::User(UserTrait::default()),
            Some(ResourceTrait::Group) => TraitPayload::Group,
            Some(ResourceTrait::Role) => TraitPayload::Role,
            Some(ResourceTrait::App) => TraitPayload::App,
            Some(ResourceTrait::Secret) => TraitPayload::Secret,
            Some(ResourceTrait::Unspecified) | None => TraitPayload::Unspecified,
        }
    }

    /// The user payload, if this is one.
    pub fn as_user(&self) -> Option<&UserTrait> {
        match self {
            TraitPayload::User(user) => Some(user),
            _ => None,
        }
    }
}

/// A materialized resource or user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceNode {
    /// Type and name.
    pub id: ResourceId,
    /// Human readable name.
    pub display_name: String,
    /// Free text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Trait payload.
    pub payload: TraitPayload,
    /// Parent resource, by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceId>,
}

impl ResourceNode {
    /// Name of the resource.
    pub fn name(&self) -> &str {
        &self.id.resource
    }

    /// Type id of the resource.
    pub fn resource_type(&self) -> &str {
        &self.id.resource_type
    }
}

/// Resources keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceCache {
    by_name: BTreeMap<String, ResourceNode>,
}

impl ResourceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resource by name.
    pub fn get(&self, name: &str) -> Option<&ResourceNode> {
        self.by_name.get(name)
    }

    /// Look up a resource by id.
    pub fn get_by_id(&self, id: &ResourceId) -> Option<&ResourceNode> {
        self.by_name
            .get(&id.resource)
            .filter(|node| node.id.resource_type == id.resource_type)
    }

    /// Check whether a name is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All resources in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.by_name.values()
    }

    /// Get the count of resources.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn insert(&mut self, node: ResourceNode) {
        self.by_name.insert(node.id.resource.clone(), node);
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ResourceNode> {
        self.by_name.get_mut(name)
    }
}

/// Build the resource cache: users first, then resources, then parent links.
///
/// # Errors
///
/// [`GraphError::MissingUserType`] when user rows exist but the type map
/// has no `user` type.
pub fn build_resource_cache(
    users: &[RawUserRecord],
    resources: &[RawResourceRecord],
    types: &ResourceTypeMap,
    diagnostics: &mut Diagnostics,
) -> GraphResult<ResourceCache> {
    let mut cache = ResourceCache::new();

    if !users.is_empty() {
        let user_type = types.get(USER_TYPE_ID).ok_or(GraphError::MissingUserType)?;
        for (row, record) in users.iter().enumerate() {
            add_user(&mut cache, user_type, row, record, diagnostics);
        }
    }

    let mut created = vec![false; resources.len()];
    for (row, record) in resources.iter().enumerate() {
        created[row] = add_resource(&mut cache, types, row, record, diagnostics);
    }

    link_parents(&mut cache, resources, &created, diagnostics);

    tracing::info!(count = cache.len(), "Built resource cache");
    Ok(cache)
}

fn add_user(
    cache: &mut ResourceCache,
    user_type: &ResourceTypeDef,
    row: usize,
    record: &RawUserRecord,
    diagnostics: &mut Diagnostics,
) {
    if record.name.trim().is_empty() {
        diagnostics.warn(
            RecordKind::User,
            row,
            DiagnosticKind::MissingField,
            "Skipping user entry with empty name",
            None,
        );
        return;
    }
    if cache.contains(&record.name) {
        diagnostics.error(
            RecordKind::User,
            row,
            DiagnosticKind::Duplicate,
            "Duplicate resource ID found (user defined multiple times)",
            Some(&record.name),
        );
        return;
    }

    let mut user = UserTrait::default();

    let email = record.email.trim();
    if !email.is_empty() {
        user.email = Some(email.to_string());
    }
    if !record.profile.is_empty() {
        user.profile = record.profile.clone();
    }

    if !record.status.trim().is_empty() {
        match UserStatus::parse(&record.status) {
            Some(status) => user.status = status,
            None => diagnostics.warn(
                RecordKind::User,
                row,
                DiagnosticKind::UnrecognizedValue,
                format!("Unrecognized user status for '{}', defaulting to enabled", record.name),
                Some(&record.status),
            ),
        }
    }

    if !record.account_type.trim().is_empty() {
        match AccountType::parse(&record.account_type) {
            Some(account_type) => user.account_type = account_type,
            None => diagnostics.warn(
                RecordKind::User,
                row,
                DiagnosticKind::UnrecognizedValue,
                format!("Unrecognized account type for '{}', defaulting to human", record.name),
                Some(&record.account_type),
            ),
        }
    }

    let last_login = record.last_login.trim();
    if !last_login.is_empty() {
        match parse_last_login(last_login) {
            Some(date) => user.last_login = Some(date),
            None => diagnostics.warn(
                RecordKind::User,
                row,
                DiagnosticKind::InvalidDate,
                format!(
                    "Failed to parse last login for '{}', skipping field (expected format MM/DD/YYYY)",
                    record.name
                ),
                Some(last_login),
            ),
        }
    }

    cache.insert(ResourceNode {
        id: ResourceId::new(&user_type.id, &record.name),
        display_name: record.display_name.clone(),
        description: None,
        payload: TraitPayload::User(user),
        parent: None,
    });
}

/// Returns `true` when the row produced a node.
fn add_resource(
    cache: &mut ResourceCache,
    types: &ResourceTypeMap,
    row: usize,
    record: &RawResourceRecord,
    diagnostics: &mut Diagnostics,
) -> bool {
    if record.name.trim().is_empty() {
        diagnostics.warn(
            RecordKind::Resource,
            row,
            DiagnosticKind::MissingField,
            "Skipping resource entry with empty name",
            None,
        );
        return false;
    }
    if cache.contains(&record.name) {
        diagnostics.error(
            RecordKind::Resource,
            row,
            DiagnosticKind::Duplicate,
            "Duplicate resource ID found (resource defined multiple times or conflicts with user)",
            Some(&record.name),
        );
        return false;
    }
    let Some(def) = types.get(&record.resource_type) else {
        diagnostics.error(
            RecordKind::Resource,
            row,
            DiagnosticKind::UnknownResourceType,
            format!("Resource type for '{}' not found in resource types", record.name),
            Some(&record.resource_type),
        );
        return false;
    };

    let description = Some(record.description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    cache.insert(ResourceNode {
        id: ResourceId::new(&def.id, &record.name),
        display_name: record.display_name.clone(),
        description,
        payload: TraitPayload::for_type(def),
        parent: None,
    });
    true
}

/// Links only rows that created their node, so a rejected duplicate row
/// never re-parents the surviving node that shares its name.
fn link_parents(
    cache: &mut ResourceCache,
    resources: &[RawResourceRecord],
    created: &[bool],
    diagnostics: &mut Diagnostics,
) {
    for (row, record) in resources.iter().enumerate() {
        let parent_name = record.parent_resource.trim();
        if parent_name.is_empty() {
            continue;
        }
        if !created[row] {
            diagnostics.error(
                RecordKind::Resource,
                row,
                DiagnosticKind::UnresolvedReference,
                format!("Child resource '{}' was not created, parent link skipped", record.name),
                Some(parent_name),
            );
            continue;
        }
        if parent_name == record.name {
            diagnostics.error(
                RecordKind::Resource,
                row,
                DiagnosticKind::UnresolvedReference,
                format!("Resource '{}' names itself as parent", record.name),
                Some(parent_name),
            );
            continue;
        }
        let Some(parent_id) = cache.get(parent_name).map(|p| p.id.clone()) else {
            diagnostics.error(
                RecordKind::Resource,
                row,
                DiagnosticKind::UnresolvedReference,
                format!("Parent resource not found for child resource '{}'", record.name),
                Some(parent_name),
            );
            continue;
        };
        if let Some(child) = cache.get_mut(&record.name) {
            tracing::debug!(child = %child.id, parent = %parent_id, "Linked parent resource");
            child.parent = Some(parent_id);
        }
    }
}

/// Parse a strict `MM/DD/YYYY` date: two-digit month and day, four-digit year.
pub fn parse_last_login(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, LAST_LOGIN_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_types::resolve_resource_types;

    fn build(
        users: &[RawUserRecord],
        resources: &[RawResourceRecord],
    ) -> (ResourceCache, Diagnostics) {
        let mut diags = Diagnostics::new();
        let types = resolve_resource_types(users, resources, &mut diags).unwrap();
        let cache = build_resource_cache(users, resources, &types, &mut diags).unwrap();
        (cache, diags)
    }

    #[test]
    fn test_user_fields_are_mapped() {
        let users = vec![RawUserRecord::new("alice", "Alice")
            .with_email("alice@example.com")
            .with_status("Suspended")
            .with_account_type("BOT")
            .with_last_login("03/15/2024")
            .with_profile_attr("department", "eng")];
        let (cache, diags) = build(&users, &[]);

        let alice = cache.get("alice").unwrap();
        assert_eq!(alice.id, ResourceId::new("user", "alice"));
        assert_eq!(alice.display_name, "Alice");
        let user = alice.payload.as_user().unwrap();
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.status, UserStatus::Disabled);
        assert_eq!(user.account_type, AccountType::Service);
        assert_eq!(user.last_login, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(user.profile["department"], "eng");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_empty_status_defaults_silently() {
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let (cache, diags) = build(&users, &[]);

        let user = cache.get("alice").unwrap().payload.as_user().unwrap();
        assert_eq!(user.status, UserStatus::Enabled);
        assert_eq!(user.account_type, AccountType::Human);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unrecognized_status_defaults_with_warning() {
        let users = vec![RawUserRecord::new("alice", "Alice")
            .with_status("on-leave")
            .with_account_type("robot")];
        let (cache, diags) = build(&users, &[]);

        let user = cache.get("alice").unwrap().payload.as_user().unwrap();
        assert_eq!(user.status, UserStatus::Enabled);
        assert_eq!(user.account_type, AccountType::Human);
        assert_eq!(diags.warning_count(), 2);
        assert!(diags.has(RecordKind::User, 0, DiagnosticKind::UnrecognizedValue));
    }

    #[test]
    fn test_bad_last_login_drops_only_the_field() {
        let users = vec![RawUserRecord::new("alice", "Alice")
            .with_status("active")
            .with_last_login("13/40/2024")];
        let (cache, diags) = build(&users, &[]);

        let alice = cache.get("alice").unwrap();
        let user = alice.payload.as_user().unwrap();
        assert!(user.last_login.is_none());
        assert_eq!(user.status, UserStatus::Enabled);
        assert!(diags.has(RecordKind::User, 0, DiagnosticKind::InvalidDate));
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn test_parse_last_login_is_strict() {
        assert_eq!(parse_last_login("01/02/2006"), NaiveDate::from_ymd_opt(2006, 1, 2));
        assert!(parse_last_login("1/2/2006").is_none());
        assert!(parse_last_login("2006-01-02").is_none());
        assert!(parse_last_login("02/30/2024").is_none());
        assert!(parse_last_login("13/40/2024").is_none());
        assert!(parse_last_login(" 1/02/2006").is_none());
    }

    #[test]
    fn test_user_and_resource_share_namespace() {
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let resources = vec![RawResourceRecord::new("team", "group", "alice", "Team Alice")];
        let (cache, diags) = build(&users, &resources);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alice").unwrap().resource_type(), "user");
        assert!(diags.has(RecordKind::Resource, 0, DiagnosticKind::Duplicate));
    }

    #[test]
    fn test_duplicate_users_first_wins() {
        let users = vec![
            RawUserRecord::new("alice", "First"),
            RawUserRecord::new("alice", "Second"),
            RawUserRecord::new("", "Nameless"),
        ];
        let (cache, diags) = build(&users, &[]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("alice").unwrap().display_name, "First");
        assert!(diags.has(RecordKind::User, 1, DiagnosticKind::Duplicate));
        assert!(diags.has(RecordKind::User, 2, DiagnosticKind::MissingField));
    }

    #[test]
    fn test_resource_payload_follows_type_trait() {
        let resources = vec![
            RawResourceRecord::new("team", "group", "eng", "Engineering"),
            RawResourceRecord::new("vault", "secret", "db-pass", "DB Password")
                .with_description("Primary database credential"),
            RawResourceRecord::new("bucket", "storage", "logs", "Logs"),
        ];
        let (cache, _) = build(&[], &resources);

        assert_eq!(cache.get("eng").unwrap().payload, TraitPayload::Group);
        let secret = cache.get("db-pass").unwrap();
        assert_eq!(secret.payload, TraitPayload::Secret);
        assert_eq!(secret.description.as_deref(), Some("Primary database credential"));
        assert_eq!(cache.get("logs").unwrap().payload, TraitPayload::Unspecified);
    }

    #[test]
    fn test_parent_linkage() {
        let resources = vec![
            RawResourceRecord::new("team", "group", "eng-backend", "Backend").with_parent("eng"),
            RawResourceRecord::new("team", "group", "eng", "Engineering"),
            RawResourceRecord::new("team", "group", "ops", "Ops").with_parent("missing"),
        ];
        let (cache, diags) = build(&[], &resources);

        assert_eq!(
            cache.get("eng-backend").unwrap().parent,
            Some(ResourceId::new("team", "eng"))
        );
        assert!(cache.get("eng").unwrap().parent.is_none());
        assert!(cache.get("ops").unwrap().parent.is_none());
        assert!(diags.has(RecordKind::Resource, 2, DiagnosticKind::UnresolvedReference));
    }

    #[test]
    fn test_rejected_duplicate_does_not_reparent_survivor() {
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let resources = vec![
            RawResourceRecord::new("team", "group", "eng", "Engineering"),
            RawResourceRecord::new("team", "group", "alice", "Team Alice").with_parent("eng"),
        ];
        let (cache, diags) = build(&users, &resources);

        assert!(cache.get("alice").unwrap().parent.is_none());
        assert!(diags.has(RecordKind::Resource, 1, DiagnosticKind::UnresolvedReference));
    }

    #[test]
    fn test_duplicate_resource_row_does_not_set_parent() {
        let resources = vec![
            RawResourceRecord::new("team", "group", "ops", "Operations"),
            RawResourceRecord::new("team", "group", "eng", "Engineering"),
            RawResourceRecord::new("team", "group", "eng", "Engineering again").with_parent("ops"),
        ];
        let (cache, diags) = build(&[], &resources);

        let eng = cache.get("eng").unwrap();
        assert_eq!(eng.display_name, "Engineering");
        assert!(eng.parent.is_none());
        assert!(diags.has(RecordKind::Resource, 2, DiagnosticKind::Duplicate));
        assert!(diags.has(RecordKind::Resource, 2, DiagnosticKind::UnresolvedReference));
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let resources = vec![RawResourceRecord::new("team", "group", "eng", "Eng").with_parent("eng")];
        let (cache, diags) = build(&[], &resources);

        assert!(cache.get("eng").unwrap().parent.is_none());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_unknown_type_is_dropped() {
        let mut diags = Diagnostics::new();
        let resources = vec![RawResourceRecord::new("team", "group", "eng", "Eng")];
        let types = resolve_resource_types(&[], &resources, &mut diags).unwrap();
        let stray = vec![RawResourceRecord::new("project", "group", "p1", "P1")];
        let cache = build_resource_cache(&[], &stray, &types, &mut diags).unwrap();

        assert!(cache.is_empty());
        assert!(diags.has(RecordKind::Resource, 0, DiagnosticKind::UnknownResourceType));
    }

    #[test]
    fn test_user_rows_without_user_type_fail() {
        let mut diags = Diagnostics::new();
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let types = ResourceTypeMap::new();
        assert_eq!(
            build_resource_cache(&users, &[], &types, &mut diags),
            Err(GraphError::MissingUserType)
        );
    }

    #[test]
    fn test_resource_with_user_trait_gets_default_user_payload() {
        let users = vec![RawUserRecord::new("alice", "Alice")];
        let resources = vec![RawResourceRecord::new("user", "user", "svc-bot", "Bot")];
        let (cache, _) = build(&users, &resources);

        let bot = cache.get("svc-bot").unwrap();
        assert_eq!(bot.resource_type(), "user");
        assert_eq!(bot.payload, TraitPayload::User(UserTrait::default()));
    }

    #[test]
    fn test_get_by_id_checks_type() {
        let resources = vec![RawResourceRecord::new("team", "group", "eng", "Eng")];
        let (cache, _) = build(&[], &resources);

        assert!(cache.get_by_id(&ResourceId::new("team", "eng")).is_some());
        assert!(cache.get_by_id(&ResourceId::new("role", "eng")).is_none());
    }
}
