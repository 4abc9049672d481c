//! Exporter: serialises a filtered view into a downloadable artifact.
//!
//! Renderers turn records into bytes; [`Exporter`] names the file and writes
//! it. An empty view yields [`ExportOutcome::NoData`] and no file.

use crate::error::{TrackerError, TrackerResult};
use crate::filter::{summarize, DateRange};
use crate::types::{Record, STORE_COLUMNS};
use config::{ExportConfig, ExportFormat};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Turns a view into file content.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, view: &[Record], range: &DateRange) -> TrackerResult<Vec<u8>>;
}

/// Single-sheet CSV with the store header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadsheetRenderer;

impl ReportRenderer for SpreadsheetRenderer {
    fn render(&self, view: &[Record], _range: &DateRange) -> TrackerResult<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(STORE_COLUMNS)?;
        for record in view {
            wtr.write_record([
                neutralize_formula(&record.instrument),
                record.quantity.to_string(),
                record.issue_date.to_cell(),
                record.return_date.to_cell(),
                neutralize_formula(&record.issued_to),
            ])?;
        }
        wtr.into_inner()
            .map_err(|e| TrackerError::Export(e.to_string()))
    }
}

/// Text cells that a spreadsheet would evaluate as a formula get a leading quote.
fn neutralize_formula(value: &str) -> String {
    let trimmed = value.trim_start();
    let risky = !trimmed.starts_with('\'')
        && matches!(trimmed.chars().next(), Some('=' | '+' | '-' | '@'));
    if risky {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

/// Plain-text report: title, one line per record, totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

impl ReportRenderer for TextReportRenderer {
    fn render(&self, view: &[Record], range: &DateRange) -> TrackerResult<Vec<u8>> {
        let mut out = format!("Instrument Issue Report - {}\n\n", range.label());
        for record in view {
            out.push_str(&record.report_line());
            out.push('\n');
        }

        let summary = summarize(view);
        out.push_str(&format!(
            "\n{} record(s), {} unit(s) issued\n",
            summary.records, summary.total_quantity
        ));
        Ok(out.into_bytes())
    }
}

/// Pretty JSON array of records.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, view: &[Record], _range: &DateRange) -> TrackerResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(view)?)
    }
}

pub fn renderer_for(format: ExportFormat) -> Box<dyn ReportRenderer> {
    match format {
        ExportFormat::Spreadsheet => Box::new(SpreadsheetRenderer),
        ExportFormat::Report => Box::new(TextReportRenderer),
        ExportFormat::Json => Box::new(JsonRenderer),
    }
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The view was empty; nothing was written.
    NoData,
    Written { path: PathBuf, records: usize },
}

/// Writes export artifacts into a directory with deterministic names.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
    file_prefix: String,
}

impl Exporter {
    pub fn new(directory: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.directory.clone(), config.file_prefix.clone())
    }

    /// e.g. `monthly_report_2024_03.txt`
    pub fn file_name(&self, range: &DateRange, format: ExportFormat) -> String {
        format!(
            "{}_{}.{}",
            self.file_prefix,
            range.file_token(),
            format.extension()
        )
    }

    /// Render the view in memory. `None` when there is nothing to export.
    pub fn render(
        &self,
        view: &[Record],
        range: &DateRange,
        format: ExportFormat,
    ) -> TrackerResult<Option<Vec<u8>>> {
        if view.is_empty() {
            return Ok(None);
        }
        renderer_for(format).render(view, range).map(Some)
    }

    #[instrument(skip(self, view), fields(records = view.len()))]
    pub async fn export(
        &self,
        view: &[Record],
        range: &DateRange,
        format: ExportFormat,
    ) -> TrackerResult<ExportOutcome> {
        let Some(bytes) = self.render(view, range, format)? else {
            info!("Nothing to export");
            return Ok(ExportOutcome::NoData);
        };

        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| TrackerError::Export(format!("{:?}: {}", self.directory, e)))?;

        let path = self.directory.join(self.file_name(range, format));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| TrackerError::Export(format!("{:?}: {}", path, e)))?;

        info!(?path, bytes = bytes.len(), "Export written");
        Ok(ExportOutcome::Written {
            path,
            records: view.len(),
        })
    }
}
