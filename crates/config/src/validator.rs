use crate::*;
use chrono::format::{Item, StrftimeItems};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("Tracker name is required")]
    MissingTrackerName,

    #[error("Store path is required")]
    MissingStorePath,

    #[error("Catalog must list at least one instrument")]
    EmptyCatalog,

    #[error("Catalog entry #{index} is blank")]
    BlankCatalogEntry { index: usize },

    #[error("Catalog lists '{0}' more than once")]
    DuplicateCatalogEntry(String),

    #[error("At least one date format must be configured")]
    NoDateFormats,

    #[error("Invalid date format '{format}': {message}")]
    InvalidDateFormat { format: String, message: String },

    #[error("Export file prefix is required")]
    MissingFilePrefix,

    #[error("Environment variable placeholder in '{field}' is unresolved")]
    UnresolvedEnvVar { field: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &TrackerConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    if config.tracker.name.trim().is_empty() {
        report.add_error(ValidationError::MissingTrackerName);
    }

    validate_store(&config.store, &mut report);
    validate_catalog(&config.catalog, &mut report);
    validate_dates(&config.dates, &mut report);
    validate_export(&config.export, &mut report);

    if config.validation.reject_return_before_issue {
        report.add_warning(
            "validation.reject_return_before_issue",
            "Entries with a return date before the issue date will be rejected",
        );
    }

    report
}

fn validate_store(store: &StoreConfig, report: &mut ValidationReport) {
    let path = store.path.to_string_lossy();
    if path.trim().is_empty() {
        report.add_error(ValidationError::MissingStorePath);
        return;
    }

    if has_unresolved_env_vars(&path) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "store.path".to_string(),
        });
    }

    if store.path == default_store_path() {
        report.add_default("store.path", DEFAULT_STORE_FILE);
    }

    if !store.atomic_writes {
        report.add_warning(
            "store.atomic_writes",
            "Store is overwritten in place; a crash mid-write can corrupt it",
        );
    }
}

fn validate_catalog(catalog: &CatalogConfig, report: &mut ValidationReport) {
    if catalog.instruments.is_empty() {
        report.add_error(ValidationError::EmptyCatalog);
        return;
    }

    let mut seen = HashSet::new();
    for (index, name) in catalog.instruments.iter().enumerate() {
        if name.trim().is_empty() {
            report.add_error(ValidationError::BlankCatalogEntry { index });
            continue;
        }
        if !seen.insert(name.as_str()) {
            report.add_error(ValidationError::DuplicateCatalogEntry(name.clone()));
        }
    }
}

fn validate_dates(dates: &DateConfig, report: &mut ValidationReport) {
    if dates.formats.is_empty() {
        report.add_error(ValidationError::NoDateFormats);
        return;
    }

    for format in &dates.formats {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            report.add_error(ValidationError::InvalidDateFormat {
                format: format.clone(),
                message: "not a valid strftime pattern".to_string(),
            });
        }
    }

    if dates.formats.first().map(String::as_str) != Some("%Y-%m-%d") {
        report.add_warning(
            "dates.formats",
            "ISO dates (%Y-%m-%d) are not tried first when reading imported sheets",
        );
    }
}

fn validate_export(export: &ExportConfig, report: &mut ValidationReport) {
    if export.file_prefix.trim().is_empty() {
        report.add_error(ValidationError::MissingFilePrefix);
    }

    if export.directory == default_export_directory() {
        report.add_default("export.directory", ".");
    }

    if has_unresolved_env_vars(&export.directory.to_string_lossy()) {
        report.add_error(ValidationError::UnresolvedEnvVar {
            field: "export.directory".to_string(),
        });
    }
}
