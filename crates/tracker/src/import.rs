//! Bulk import of externally authored sheets.
//!
//! Imported rows skip catalog and entry validation. Names are trimmed, dates
//! that do not parse become absent, and rows whose quantity is not a whole
//! number are skipped.

use crate::error::{TrackerError, TrackerResult};
use crate::rows::decode_rows;
use crate::types::Record;
use std::path::Path;
use tracing::{instrument, warn};

/// Rows read from a sheet.
#[derive(Debug, Clone, Default)]
pub struct ImportedSheet {
    pub records: Vec<Record>,
    /// 1-based line numbers of rows that could not be decoded.
    pub malformed: Vec<u64>,
}

#[instrument(skip(date_formats))]
pub async fn read_sheet(path: &Path, date_formats: &[String]) -> TrackerResult<ImportedSheet> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| TrackerError::Import(format!("{:?}: {}", path, e)))?;

    let rows = decode_rows(bytes.as_slice(), date_formats)
        .map_err(|e| TrackerError::Import(format!("{:?}: {}", path, e)))?;

    let mut sheet = ImportedSheet::default();
    for row in rows {
        match row.result {
            Ok(mut record) => {
                record.instrument = record.instrument.trim().to_string();
                record.issued_to = record.issued_to.trim().to_string();
                sheet.records.push(record);
            }
            Err(message) => {
                warn!(line = row.line, %message, "Skipping malformed row");
                sheet.malformed.push(row.line);
            }
        }
    }
    Ok(sheet)
}
