use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub tracker: TrackerSection,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub dates: DateConfig,
    #[serde(default)]
    pub validation: EntryValidationConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerSection {
    #[serde(default = "default_tracker_name")]
    pub name: String,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            name: default_tracker_name(),
        }
    }
}

/// Location and write policy of the flat record store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Write to a sibling temp file and rename it over the store.
    #[serde(rename = "atomic_writes")]
    #[serde(default = "default_atomic_writes")]
    pub atomic_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            atomic_writes: default_atomic_writes(),
        }
    }
}

/// Closed set of instrument names accepted by the entry form.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,
}

impl CatalogConfig {
    pub fn contains(&self, instrument: &str) -> bool {
        self.instruments.iter().any(|i| i == instrument)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
        }
    }
}

/// strftime patterns tried, in order, when reading date cells.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DateConfig {
    #[serde(default = "default_date_formats")]
    pub formats: Vec<String>,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            formats: default_date_formats(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntryValidationConfig {
    /// Reject entries whose return date precedes the issue date instead of warning.
    #[serde(rename = "reject_return_before_issue")]
    #[serde(default)]
    pub reject_return_before_issue: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
    #[serde(rename = "file_prefix")]
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(rename = "default_format")]
    #[serde(default)]
    pub default_format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            file_prefix: default_file_prefix(),
            default_format: ExportFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Single-sheet CSV workbook
    Spreadsheet,
    /// Human-readable text report, one line per record
    #[default]
    Report,
    /// Pretty-printed JSON array
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Report => "report",
            ExportFormat::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "csv",
            ExportFormat::Report => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: TrackerConfig = serde_yaml::from_str("tracker:\n  name: Lab\n").unwrap();

        assert_eq!(config.tracker.name, "Lab");
        assert_eq!(config.store.path, PathBuf::from("instrument_data.csv"));
        assert!(config.store.atomic_writes);
        assert_eq!(config.catalog.instruments.len(), 6);
        assert_eq!(config.export.default_format, ExportFormat::Report);
        assert!(!config.validation.reject_return_before_issue);
    }

    #[test]
    fn test_catalog_contains_is_exact() {
        let catalog = CatalogConfig::default();
        assert!(catalog.contains("Lux Meter"));
        assert!(catalog.contains("eGauge"));
        assert!(!catalog.contains("lux meter"));
        assert!(!catalog.contains("Oscilloscope"));
    }

    #[test]
    fn test_export_format_serde() {
        let format: ExportFormat = serde_yaml::from_str("spreadsheet").unwrap();
        assert_eq!(format, ExportFormat::Spreadsheet);
        assert_eq!(format.extension(), "csv");
        assert_eq!(ExportFormat::Json.to_string(), "json");
    }
}
