//! Entry-form validation for record candidates.

use crate::types::NewRecord;
use chrono::NaiveDate;
use config::{CatalogConfig, EntryValidationConfig};
use thiserror::Error;

/// Reasons a candidate record is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordRejection {
    #[error("Issued To is required")]
    MissingIssuedTo,

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    #[error("Instrument '{0}' is not in the catalog")]
    UnknownInstrument(String),

    #[error("Return date {return_date} is before issue date {issue_date}")]
    ReturnBeforeIssue {
        issue_date: NaiveDate,
        return_date: NaiveDate,
    },
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, Default)]
pub struct RecordValidation {
    pub errors: Vec<RecordRejection>,
    pub warnings: Vec<String>,
}

impl RecordValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks candidates against the catalog and the entry rules.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    catalog: CatalogConfig,
    rules: EntryValidationConfig,
}

impl RecordValidator {
    pub fn new(catalog: CatalogConfig, rules: EntryValidationConfig) -> Self {
        Self { catalog, rules }
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn validate(&self, candidate: &NewRecord) -> RecordValidation {
        let mut report = RecordValidation::default();

        if candidate.issued_to.trim().is_empty() {
            report.errors.push(RecordRejection::MissingIssuedTo);
        }

        if candidate.quantity == 0 {
            report
                .errors
                .push(RecordRejection::InvalidQuantity(candidate.quantity));
        }

        if !self.catalog.contains(&candidate.instrument) {
            report
                .errors
                .push(RecordRejection::UnknownInstrument(candidate.instrument.clone()));
        }

        if candidate.return_date < candidate.issue_date {
            let rejection = RecordRejection::ReturnBeforeIssue {
                issue_date: candidate.issue_date,
                return_date: candidate.return_date,
            };
            if self.rules.reject_return_before_issue {
                report.errors.push(rejection);
            } else {
                report.warnings.push(rejection.to_string());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(issued_to: &str) -> NewRecord {
        NewRecord {
            instrument: "Lux Meter".to_string(),
            quantity: 2,
            issue_date: ymd(2024, 3, 1),
            return_date: ymd(2024, 3, 10),
            issued_to: issued_to.to_string(),
        }
    }

    fn validator(reject_early_return: bool) -> RecordValidator {
        RecordValidator::new(
            CatalogConfig::default(),
            EntryValidationConfig {
                reject_return_before_issue: reject_early_return,
            },
        )
    }

    #[test]
    fn test_valid_candidate() {
        let report = validator(false).validate(&candidate("Asha"));
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_blank_issued_to_rejected() {
        let report = validator(false).validate(&candidate("   "));
        assert_eq!(report.errors, vec![RecordRejection::MissingIssuedTo]);
    }

    #[test]
    fn test_quantity_and_catalog() {
        let mut c = candidate("Asha");
        c.quantity = 0;
        c.instrument = "Oscilloscope".to_string();

        let report = validator(false).validate(&c);
        assert_eq!(
            report.errors,
            vec![
                RecordRejection::InvalidQuantity(0),
                RecordRejection::UnknownInstrument("Oscilloscope".to_string()),
            ]
        );
    }

    #[test]
    fn test_early_return_warns_by_default() {
        let mut c = candidate("Asha");
        c.return_date = ymd(2024, 2, 20);

        let lenient = validator(false).validate(&c);
        assert!(lenient.is_valid());
        assert_eq!(lenient.warnings.len(), 1);

        let strict = validator(true).validate(&c);
        assert!(matches!(
            strict.errors.as_slice(),
            [RecordRejection::ReturnBeforeIssue { .. }]
        ));
    }
}
