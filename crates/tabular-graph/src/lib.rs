//! # Tabular Identity Graph
//!
//! This crate turns flat tabular records (spreadsheet rows or structured
//! documents) into a typed identity graph of resources, entitlements and
//! grants.
//!
//! ## Overview
//!
//! The tabular-graph crate handles:
//! - **Resource Types**: Inferred from the resource rows, one per distinct type label
//! - **Resources**: Users and resources in one shared namespace, with parent links
//! - **Entitlements**: Permissions scoped to a resource, keyed by `resource:slug`
//! - **Grants**: Principal to entitlement edges, with group membership expansion
//! - **Pagination**: Offset windows over deterministically sorted listings
//!
//! ## Architecture
//!
//! ```text
//! RecordSet (users, resources, entitlements, grants)
//!   └─ ResourceTypeMap      (type label → ResourceTypeDef)
//!        └─ ResourceCache   (name → ResourceNode, parent by id)
//!             └─ EntitlementCache  ("resource:slug" → EntitlementNode)
//!                  └─ GrantResolver (per context resource → GrantEdge)
//! ```
//!
//! Every build starts from scratch. Bad rows never fail a build; they are
//! skipped and recorded as [`Diagnostic`]s. Only structural problems, such as
//! a record set with no resource types at all, return a [`GraphError`].
//!
//! ## Usage
//!
//! ```rust
//! use tabular_graph::{
//!     IdentityGraph, Paginator, RawEntitlementRecord, RawGrantRecord, RawResourceRecord,
//!     RawUserRecord, RecordSet, ResourceId,
//! };
//!
//! let records = RecordSet {
//!     users: vec![RawUserRecord::new("alice", "Alice")],
//!     resources: vec![RawResourceRecord::new("team", "group", "eng", "Engineering")],
//!     entitlements: vec![RawEntitlementRecord::new("eng", "member")],
//!     grants: vec![RawGrantRecord::new("alice", "eng:member")],
//! };
//!
//! let mut graph = IdentityGraph::build(&records).unwrap();
//! let grants = graph.grants_for(&ResourceId::new("team", "eng"));
//! assert_eq!(grants.len(), 1);
//!
//! let page = Paginator::default().paginate(grants, "").unwrap();
//! assert!(page.next_page_token.is_none());
//! ```

pub mod diagnostics;
pub mod entitlements;
pub mod error;
pub mod grants;
pub mod graph;
pub mod pagination;
pub mod records;
pub mod resource_types;
pub mod resources;
pub mod traits;

// Re-export main types for convenience
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, RecordKind, Severity};
pub use entitlements::{entitlement_key, EntitlementCache, EntitlementNode, EntitlementPurpose};
pub use error::{GraphError, GraphResult};
pub use grants::{GrantEdge, GrantExpansion, GrantResolver, PrincipalRef};
pub use graph::IdentityGraph;
pub use pagination::{Page, Paginator, DEFAULT_PAGE_SIZE};
pub use records::{
    RawEntitlementRecord, RawGrantRecord, RawResourceRecord, RawUserRecord, RecordSet,
};
pub use resource_types::{ResourceTypeDef, ResourceTypeMap, USER_TYPE_ID};
pub use resources::{
    AccountType, ResourceCache, ResourceId, ResourceNode, TraitPayload, UserStatus, UserTrait,
};
pub use traits::ResourceTrait;
