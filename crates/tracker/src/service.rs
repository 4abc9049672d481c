//! Issue service - the high-level API behind every user interaction.
//!
//! One call is one full cycle: validate, load, append, persist, and hand back
//! a pruned view. Filtering and reporting always start from a fresh load.

use crate::error::{TrackerError, TrackerResult};
use crate::filter::{apply, prune_undated, sort_for_display, DateRange, FilterQuery, Pruned};
use crate::import::read_sheet;
use crate::store::RecordStore;
use crate::types::{NewRecord, Record};
use crate::validator::{RecordValidation, RecordValidator};
use chrono::NaiveDate;
use config::TrackerConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A record accepted by [`IssueService::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: Record,
    /// Non-blocking notes from validation.
    pub warnings: Vec<String>,
    /// Dated records in the store after the append.
    pub stored: usize,
}

/// Counts from a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows dropped because their issue date did not parse.
    pub undated: usize,
    /// Rows skipped because they could not be decoded.
    pub malformed: usize,
}

pub struct IssueService<S: RecordStore + ?Sized> {
    store: Arc<S>,
    validator: RecordValidator,
    date_formats: Vec<String>,
}

impl<S: RecordStore + ?Sized> IssueService<S> {
    pub fn new(store: Arc<S>, validator: RecordValidator, date_formats: Vec<String>) -> Self {
        Self {
            store,
            validator,
            date_formats,
        }
    }

    pub fn from_config(store: Arc<S>, config: &TrackerConfig) -> Self {
        Self::new(
            store,
            RecordValidator::new(config.catalog.clone(), config.validation.clone()),
            config.dates.formats.clone(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &[String] {
        &self.validator.catalog().instruments
    }

    pub fn validate(&self, candidate: &NewRecord) -> RecordValidation {
        self.validator.validate(candidate)
    }

    /// Validate and append a candidate.
    ///
    /// Validation runs before any I/O, so a rejected candidate never creates
    /// or modifies the store.
    #[instrument(skip(self, candidate), fields(instrument = %candidate.instrument))]
    pub async fn submit(&self, candidate: NewRecord) -> TrackerResult<Submission> {
        let report = self.validator.validate(&candidate);
        if !report.is_valid() {
            warn!(errors = report.errors.len(), "Candidate rejected");
            return Err(TrackerError::Rejected(report.errors));
        }
        for warning in &report.warnings {
            warn!(%warning, "Accepted with warning");
        }

        let record = candidate.into_record();
        self.store.load().await?;
        self.store.append(record.clone()).await?;

        let stored = self.records().await?.kept.len();
        info!(stored, location = %self.store.location(), "Record saved");

        Ok(Submission {
            record,
            warnings: report.warnings,
            stored,
        })
    }

    /// Fresh load of the store with undated rows pruned.
    pub async fn records(&self) -> TrackerResult<Pruned> {
        let pruned = prune_undated(self.store.load().await?);
        if pruned.dropped > 0 {
            warn!(dropped = pruned.dropped, "Records without a valid issue date are hidden");
        }
        Ok(pruned)
    }

    /// Every dated record, newest issue date first.
    pub async fn all_records(&self) -> TrackerResult<Vec<Record>> {
        Ok(sort_for_display(&self.records().await?.kept))
    }

    /// Records matching `query`, in store order.
    pub async fn query(&self, query: &FilterQuery) -> TrackerResult<Vec<Record>> {
        Ok(apply(&self.records().await?.kept, query))
    }

    /// Build a query whose missing date bounds default to the span of the stored records.
    pub async fn query_with_bounds(
        &self,
        query: FilterQuery,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
        today: NaiveDate,
    ) -> TrackerResult<(FilterQuery, Vec<Record>)> {
        let records = self.records().await?.kept;
        let query = query.with_bounds(since, until, &records, today);
        let view = apply(&records, &query);
        Ok((query, view))
    }

    /// Records issued during the month containing `month`.
    pub async fn monthly(&self, month: NaiveDate) -> TrackerResult<(DateRange, Vec<Record>)> {
        let range = DateRange::month_of(month);
        let view = self
            .query(&FilterQuery::new().with_date_range(range))
            .await?;
        Ok((range, view))
    }

    /// Append every dated row of an external sheet to the store.
    #[instrument(skip(self))]
    pub async fn import(&self, path: &Path) -> TrackerResult<ImportSummary> {
        let sheet = read_sheet(path, &self.date_formats).await?;
        let pruned = prune_undated(sheet.records);

        let imported = if pruned.kept.is_empty() {
            0
        } else {
            self.store.load().await?;
            self.store.append_batch(pruned.kept).await?
        };

        let summary = ImportSummary {
            imported,
            undated: pruned.dropped,
            malformed: sheet.malformed.len(),
        };
        info!(?summary, "Import finished");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::store::{CsvRecordStore, InMemoryRecordStore};
    use crate::validator::RecordRejection;
    use assert_matches::assert_matches;
    use config::generate_default_config;
    use tempfile::tempdir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(instrument: &str, issue: NaiveDate, issued_to: &str) -> NewRecord {
        NewRecord {
            instrument: instrument.to_string(),
            quantity: 2,
            issue_date: issue,
            return_date: issue + chrono::Days::new(9),
            issued_to: issued_to.to_string(),
        }
    }

    fn memory_service() -> IssueService<InMemoryRecordStore> {
        IssueService::from_config(Arc::new(InMemoryRecordStore::new()), &generate_default_config())
    }

    #[tokio::test]
    async fn test_submit_then_filter_by_person() {
        let service = memory_service();
        let before = service.store().len().await.unwrap();

        let submission = service
            .submit(candidate("Lux Meter", ymd(2024, 3, 1), "Asha"))
            .await
            .unwrap();
        assert_eq!(submission.stored, before + 1);
        assert_eq!(submission.record.return_date.to_string(), "2024-03-10");

        let asha = service
            .query(&FilterQuery::new().with_person("Asha"))
            .await
            .unwrap();
        assert_eq!(asha, vec![submission.record]);

        let raj = service
            .query(&FilterQuery::new().with_person("Raj"))
            .await
            .unwrap();
        assert!(raj.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_candidate_creates_no_store_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("instrument_data.csv");
        let store = Arc::new(CsvRecordStore::new(&path, config::default_date_formats()));
        let service = IssueService::from_config(store, &generate_default_config());

        let result = service.submit(candidate("Lux Meter", ymd(2024, 3, 1), "")).await;
        assert_matches!(result, Err(TrackerError::Rejected(ref errors)) if errors == &vec![RecordRejection::MissingIssuedTo]);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_append_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("instrument_data.csv");
        let config = generate_default_config();

        let service = IssueService::from_config(
            Arc::new(CsvRecordStore::new(&path, config.dates.formats.clone())),
            &config,
        );
        service
            .submit(candidate("eGauge", ymd(2024, 5, 2), "Raj"))
            .await
            .unwrap();
        let submission = service
            .submit(candidate("Distance Gun", ymd(2024, 1, 7), "Mina"))
            .await
            .unwrap();

        let fresh = CsvRecordStore::new(&path, config.dates.formats.clone());
        let reloaded = fresh.load().await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.last(), Some(&submission.record));
    }

    #[tokio::test]
    async fn test_monthly_keeps_insertion_order() {
        let service = memory_service();
        service.submit(candidate("Lux Meter", ymd(2024, 3, 20), "Asha")).await.unwrap();
        service.submit(candidate("eGauge", ymd(2024, 4, 2), "Raj")).await.unwrap();
        service.submit(candidate("Lux Meter", ymd(2024, 3, 5), "Raj")).await.unwrap();

        let (range, view) = service.monthly(ymd(2024, 3, 15)).await.unwrap();
        assert_eq!(range, DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)));
        let dates: Vec<_> = view.iter().map(|r| r.issue_date.to_string()).collect();
        assert_eq!(dates, ["2024-03-20", "2024-03-05"]);

        let all = service.all_records().await.unwrap();
        assert_eq!(all[0].issue_date.to_string(), "2024-04-02");
    }

    #[tokio::test]
    async fn test_query_with_bounds_defaults() {
        let service = memory_service();
        let today = ymd(2026, 10, 16);

        let (query, view) = service
            .query_with_bounds(FilterQuery::new(), None, None, today)
            .await
            .unwrap();
        assert_eq!(query.date_range, Some(DateRange::new(today, today)));
        assert!(view.is_empty());

        service.submit(candidate("eGauge", ymd(2024, 2, 1), "Raj")).await.unwrap();
        service.submit(candidate("eGauge", ymd(2024, 6, 1), "Asha")).await.unwrap();
        let (query, view) = service
            .query_with_bounds(
                FilterQuery::new().with_instrument(Selection::parse("eGauge")),
                None,
                None,
                today,
            )
            .await
            .unwrap();
        assert_eq!(query.date_range, Some(DateRange::new(ymd(2024, 2, 1), ymd(2024, 6, 1))));
        assert_eq!(view.len(), 2);
    }

    #[tokio::test]
    async fn test_import_appends_dated_rows() {
        let dir = tempdir().unwrap();
        let sheet = dir.path().join("upload.csv");
        std::fs::write(
            &sheet,
            "Issue Date,Instrument,Quantity,Issued To\n\
             2024-03-01,Oscilloscope,1,Asha\n\
             bad date,eGauge,1,Raj\n\
             2024-03-09,eGauge,x,Raj\n",
        )
        .unwrap();

        let service = memory_service();
        let summary = service.import(&sheet).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 1,
                undated: 1,
                malformed: 1
            }
        );
        let records = service.store().all().await.unwrap();
        assert_eq!(records[0].instrument, "Oscilloscope");
    }

    #[tokio::test]
    async fn test_undated_store_rows_are_hidden() {
        let store = Arc::new(InMemoryRecordStore::with_records(
            vec![
                Record::new("eGauge", 1, crate::types::DateField::Absent, ymd(2024, 3, 2), "Raj"),
                Record::new("eGauge", 1, ymd(2024, 3, 1), ymd(2024, 3, 2), "Asha"),
            ],
            "sheet",
        ));
        let service = IssueService::from_config(store, &generate_default_config());

        let pruned = service.records().await.unwrap();
        assert_eq!(pruned.dropped, 1);
        assert_eq!(service.query(&FilterQuery::new()).await.unwrap().len(), 1);
    }
}
