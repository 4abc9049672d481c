//! RecordStore trait definition

use crate::error::TrackerResult;
use crate::types::Record;
use async_trait::async_trait;

/// RecordStore trait - the narrow persistence interface for issue records.
///
/// Implementations (flat CSV file, in-memory, ...) can be swapped without
/// touching the filter engine or the exporter. Records are kept in append
/// order; there is no update or delete.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the full sequence from the backing location.
    ///
    /// A store that does not exist yet is initialised empty and returns no records.
    async fn load(&self) -> TrackerResult<Vec<Record>>;

    /// Append one record and persist the whole sequence.
    ///
    /// If persisting fails the store is left as it was before the call.
    async fn append(&self, record: Record) -> TrackerResult<()>;

    /// Append several records with a single persist. Returns how many were added.
    async fn append_batch(&self, records: Vec<Record>) -> TrackerResult<usize>;

    /// Current sequence, loading first if nothing has been read yet.
    async fn all(&self) -> TrackerResult<Vec<Record>>;

    /// Human-readable description of where records live.
    fn location(&self) -> String;

    /// Number of stored records.
    async fn len(&self) -> TrackerResult<usize> {
        Ok(self.all().await?.len())
    }
}
