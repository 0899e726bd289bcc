//! # Tabular Connector
//!
//! This crate exposes a [`tabular_graph::IdentityGraph`] through a paginated
//! listing surface, one syncer per resource type.
//!
//! ## Overview
//!
//! The tabular-connector crate handles:
//! - **Loading**: A [`RecordLoader`] delivers one record snapshot per call
//! - **Listing**: Resources, entitlements and grants per resource type
//! - **Pagination**: Opaque page tokens, empty for the first page
//! - **Configuration**: Page size and metadata from the environment
//!
//! No state survives between listing calls. Each call reloads the source
//! and rebuilds the graph, so successive calls may observe different
//! snapshots if the source changes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tabular_connector::{ConnectorConfig, MemoryRecordLoader, TabularConnector};
//! use tabular_graph::{RawResourceRecord, RawUserRecord, RecordSet};
//!
//! async fn sync_example() -> tabular_connector::ConnectorResult<()> {
//!     let records = RecordSet {
//!         users: vec![RawUserRecord::new("alice", "Alice")],
//!         resources: vec![RawResourceRecord::new("team", "group", "eng", "Engineering")],
//!         ..RecordSet::new()
//!     };
//!     let loader = Arc::new(MemoryRecordLoader::new(records));
//!     let connector = TabularConnector::new(loader, ConnectorConfig::from_env())?;
//!
//!     let teams = connector.syncer("team").await?;
//!     let mut token = String::new();
//!     loop {
//!         let page = teams.list_resources(None, &token).await?;
//!         for team in &page.items {
//!             let grants = teams.list_grants(&team.id, "").await?;
//!             println!("{}: {} grants", team.id, grants.items.len());
//!         }
//!         match page.next_page_token {
//!             Some(next) => token = next,
//!             None => break,
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod loader;
pub mod syncer;

// Re-export main types for convenience
pub use config::{ConfigError, ConnectorConfig};
pub use connector::{ConnectorMetadata, TabularConnector};
pub use error::{ConnectorError, ConnectorResult};
pub use loader::{MemoryRecordLoader, RecordLoader};
pub use syncer::ResourceSyncer;
