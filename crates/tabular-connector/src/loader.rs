//! Record loading
//!
//! A [`RecordLoader`] delivers one self-consistent [`RecordSet`] per call.
//! File-format readers live outside this crate and implement the trait;
//! [`MemoryRecordLoader`] holds a snapshot in memory.

use async_trait::async_trait;
use std::sync::Arc;
use tabular_graph::RecordSet;
use tokio::sync::RwLock;

use crate::error::ConnectorResult;

/// Source of raw records.
///
/// Successive calls may return different snapshots if the backing source
/// changes between them. Each returned set must come from a single read
/// pass, with rows in source order.
#[async_trait]
pub trait RecordLoader: Send + Sync {
    /// Load the current record set.
    async fn load_records(&self) -> ConnectorResult<RecordSet>;

    /// Label of the source, for logs and errors.
    fn source_name(&self) -> &str;
}

/// In-memory record loader.
///
/// Useful for tests and for callers that parse the source themselves. The
/// snapshot can be swapped between calls with [`MemoryRecordLoader::replace`].
pub struct MemoryRecordLoader {
    name: String,
    records: Arc<RwLock<RecordSet>>,
}

impl MemoryRecordLoader {
    /// Create a loader serving `records`.
    pub fn new(records: RecordSet) -> Self {
        Self::with_name("memory", records)
    }

    /// Create a loader with a custom source label.
    pub fn with_name(name: impl Into<String>, records: RecordSet) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Swap in a new snapshot. Calls already holding a snapshot keep it.
    pub async fn replace(&self, records: RecordSet) {
        let mut current = self.records.write().await;
        *current = records;
        tracing::debug!(source = %self.name, "Replaced in-memory record snapshot");
    }
}

impl std::fmt::Debug for MemoryRecordLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRecordLoader")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordLoader for MemoryRecordLoader {
    async fn load_records(&self) -> ConnectorResult<RecordSet> {
        let records = self.records.read().await;
        Ok(records.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
