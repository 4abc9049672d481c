//! Flat CSV file record store.
//!
//! The whole file is rewritten on every append. With atomic writes enabled
//! (the default) the new content goes to `<store>.tmp` first and is then
//! renamed over the store, so a crash mid-write leaves the old file intact.

use crate::error::{TrackerError, TrackerResult};
use crate::rows::{decode_rows, encode_rows};
use crate::store::traits::RecordStore;
use crate::types::{Record, ISO_DATE};
use async_trait::async_trait;
use config::{DateConfig, StoreConfig};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// The store is written in ISO form, so ISO is tried first on every read
/// whatever the configured formats say.
fn store_read_formats(configured: Vec<String>) -> Vec<String> {
    let mut formats = vec![ISO_DATE.to_string()];
    formats.extend(configured.into_iter().filter(|f| f != ISO_DATE));
    formats
}

/// Record store backed by a single delimited file.
#[derive(Debug)]
pub struct CsvRecordStore {
    path: PathBuf,
    date_formats: Vec<String>,
    atomic_writes: bool,
    /// `None` until the file has been read once.
    records: RwLock<Option<Vec<Record>>>,
    /// Serialises read-modify-persist cycles within this process.
    write_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>, date_formats: Vec<String>) -> Self {
        Self {
            path: path.into(),
            date_formats: store_read_formats(date_formats),
            atomic_writes: true,
            records: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(store: &StoreConfig, dates: &DateConfig) -> Self {
        Self::new(store.path.clone(), dates.formats.clone()).with_atomic_writes(store.atomic_writes)
    }

    pub fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic_writes = atomic;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn cached(&self) -> Option<Vec<Record>> {
        self.records.read().clone()
    }

    fn replace_cache(&self, records: Vec<Record>) {
        *self.records.write() = Some(records);
    }

    async fn read_file(&self) -> TrackerResult<Vec<Record>> {
        let bytes = fs::read(&self.path)
            .await
            .map_err(|e| TrackerError::storage(&self.path, e))?;

        let mut records = Vec::new();
        for row in decode_rows(bytes.as_slice(), &self.date_formats)? {
            match row.result {
                Ok(record) => records.push(record),
                Err(message) => {
                    return Err(TrackerError::CorruptRow {
                        line: row.line,
                        message,
                    })
                }
            }
        }
        Ok(records)
    }

    async fn persist(&self, records: &[Record]) -> TrackerResult<()> {
        let bytes = encode_rows(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| TrackerError::storage(parent, e))?;
        }

        if self.atomic_writes {
            let temp_path = self.temp_path();
            fs::write(&temp_path, &bytes)
                .await
                .map_err(|e| TrackerError::storage(&temp_path, e))?;
            fs::rename(&temp_path, &self.path)
                .await
                .map_err(|e| TrackerError::storage(&self.path, e))?;
        } else {
            fs::write(&self.path, &bytes)
                .await
                .map_err(|e| TrackerError::storage(&self.path, e))?;
        }

        debug!(path = ?self.path, records = records.len(), bytes = bytes.len(), "Store persisted");
        Ok(())
    }

    async fn current(&self) -> TrackerResult<Vec<Record>> {
        match self.cached() {
            Some(records) => Ok(records),
            None => self.load().await,
        }
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> TrackerResult<Vec<Record>> {
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| TrackerError::storage(&self.path, e))?;

        let records = if exists {
            let records = self.read_file().await?;
            debug!(count = records.len(), "Loaded records");
            records
        } else {
            info!("Store file not found, initialising empty store");
            self.persist(&[]).await?;
            Vec::new()
        };

        self.replace_cache(records.clone());
        Ok(records)
    }

    #[instrument(skip(self, record), fields(issued_to = %record.issued_to))]
    async fn append(&self, record: Record) -> TrackerResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.current().await?;
        next.push(record);
        self.persist(&next).await?;
        self.replace_cache(next);
        Ok(())
    }

    async fn append_batch(&self, records: Vec<Record>) -> TrackerResult<usize> {
        let _guard = self.write_lock.lock().await;

        let count = records.len();
        let mut next = self.current().await?;
        next.extend(records);
        self.persist(&next).await?;
        self.replace_cache(next);

        info!(added = count, "Batch appended to store");
        Ok(count)
    }

    async fn all(&self) -> TrackerResult<Vec<Record>> {
        self.current().await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
