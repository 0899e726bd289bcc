//! Raw record types
//!
//! These are the rows an external loader extracts from a spreadsheet tab or a
//! structured document. Every field is a plain string; nothing is validated
//! until the graph is built. Field names follow the column headers of the
//! source sheets so loaders can deserialize straight into these types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A row from the `users` tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUserRecord {
    /// Unique name, shared namespace with resource names.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Primary email address.
    pub email: String,
    /// Status string such as `active` or `suspended`.
    pub status: String,
    /// Account type string such as `human` or `service`.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Last login in `MM/DD/YYYY` form.
    pub last_login: String,
    /// Free-form profile attributes (`user_profile_*` columns).
    pub profile: BTreeMap<String, Value>,
}

impl RawUserRecord {
    /// Create a user row with only a name and display name set.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Set the email column.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Set the status column.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the account type column.
    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = account_type.into();
        self
    }

    /// Set the last login column.
    pub fn with_last_login(mut self, last_login: impl Into<String>) -> Self {
        self.last_login = last_login.into();
        self
    }

    /// Add a profile attribute.
    pub fn with_profile_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }
}

/// A row from the `resources` tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResourceRecord {
    /// Resource type label, e.g. `role`, `team`, `workspace`.
    pub resource_type: String,
    /// Trait hint, e.g. `group` or `role`.
    pub resource_function: String,
    /// Unique name, shared namespace with user names.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
    /// Free text description.
    pub description: String,
    /// Name of the parent resource, empty when top level.
    pub parent_resource: String,
}

impl RawResourceRecord {
    /// Create a resource row.
    pub fn new(
        resource_type: impl Into<String>,
        resource_function: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_function: resource_function.into(),
            name: name.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Set the description column.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the parent resource column.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_resource = parent.into();
        self
    }
}

/// A row from the `entitlements` tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEntitlementRecord {
    /// Name of the resource the entitlement is defined on.
    pub resource_name: String,
    /// Entitlement slug.
    #[serde(rename = "entitlement")]
    pub slug: String,
    /// Human readable name.
    pub display_name: String,
    /// Free text description.
    pub description: String,
}

impl RawEntitlementRecord {
    /// Create an entitlement row.
    pub fn new(resource_name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            slug: slug.into(),
            ..Default::default()
        }
    }

    /// Set the display name column.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description column.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A row from the `grants` tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGrantRecord {
    /// Either a resource/user name or an entitlement key (`resource:slug`).
    pub principal: String,
    /// Target entitlement key (`resource:slug`).
    pub entitlement_id: String,
}

impl RawGrantRecord {
    /// Create a grant row.
    pub fn new(principal: impl Into<String>, entitlement_id: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            entitlement_id: entitlement_id.into(),
        }
    }
}

/// All four record lists from one read of the source.
///
/// The lists are consistent with a single read pass but carry no guarantee
/// of matching an earlier or later read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    /// User rows.
    pub users: Vec<RawUserRecord>,
    /// Resource rows.
    pub resources: Vec<RawResourceRecord>,
    /// Entitlement rows.
    pub entitlements: Vec<RawEntitlementRecord>,
    /// Grant rows.
    pub grants: Vec<RawGrantRecord>,
}

impl RecordSet {
    /// Create an empty record set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all four lists.
    pub fn len(&self) -> usize {
        self.users.len() + self.resources.len() + self.entitlements.len() + self.grants.len()
    }

    /// Check if every list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
