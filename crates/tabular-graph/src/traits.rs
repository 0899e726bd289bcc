//! # Resource Traits
//!
//! Capability tags attached to resource types. The trait decides which
//! payload a resource carries and whether membership grants expand.

use serde::{Deserialize, Serialize};

/// Capability tag on a resource type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrait {
    /// The resource function column held a value outside the known table.
    Unspecified,
    /// Human or service accounts.
    User,
    /// Collections of principals, e.g. teams.
    Group,
    /// Roles that can be assigned.
    Role,
    /// Applications.
    App,
    /// Secrets and credentials.
    Secret,
}

impl ResourceTrait {
    /// Get the string representation of the trait.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceTrait::Unspecified => "unspecified",
            ResourceTrait::User => "user",
            ResourceTrait::Group => "group",
            ResourceTrait::Role => "role",
            ResourceTrait::App => "app",
            ResourceTrait::Secret => "secret",
        }
    }

    /// Parse a resource function label (case-insensitive, surrounding
    /// whitespace ignored).
    ///
    /// Returns `None` for anything outside the fixed trait table, including
    /// `"unspecified"` itself.
    ///
    /// # Example
    ///
    /// ```
    /// use tabular_graph::traits::ResourceTrait;
    ///
    /// assert_eq!(ResourceTrait::parse("Group"), Some(ResourceTrait::Group));
    /// assert_eq!(ResourceTrait::parse("team"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(ResourceTrait::User),
            "group" => Some(ResourceTrait::Group),
            "role" => Some(ResourceTrait::Role),
            "app" => Some(ResourceTrait::App),
            "secret" => Some(ResourceTrait::Secret),
            _ => None,
        }
    }

    /// Whether a principal with this trait is directly addressable, so its
    /// membership never needs expanding.
    pub fn is_directly_addressable(&self) -> bool {
        matches!(self, ResourceTrait::User | ResourceTrait::App)
    }
}
