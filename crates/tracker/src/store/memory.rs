//! In-memory record store implementation

use crate::error::TrackerResult;
use crate::store::traits::RecordStore;
use crate::types::Record;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory record store for testing and for read-only external sheets.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<Record>>>,
    label: String,
}

impl InMemoryRecordStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            label: "memory".to_string(),
        }
    }

    /// Create a store pre-filled with records, e.g. rows read from an external sheet.
    pub fn with_records(records: Vec<Record>, label: impl Into<String>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            label: label.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryRecordStore {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            label: self.label.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn load(&self) -> TrackerResult<Vec<Record>> {
        Ok(self.records.read().clone())
    }

    async fn append(&self, record: Record) -> TrackerResult<()> {
        self.records.write().push(record);
        Ok(())
    }

    async fn append_batch(&self, records: Vec<Record>) -> TrackerResult<usize> {
        let count = records.len();
        self.records.write().extend(records);
        Ok(count)
    }

    async fn all(&self) -> TrackerResult<Vec<Record>> {
        Ok(self.records.read().clone())
    }

    fn location(&self) -> String {
        self.label.clone()
    }
}
