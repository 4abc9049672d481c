//! # Tracker Crate
//!
//! Record keeping for instrument issues: who took which instrument, how many,
//! when it went out and when it is due back.
//!
//! ## Key Components
//!
//! - **Domain Types**: `Record`, `NewRecord`, `DateField`
//! - **Store**: `RecordStore` trait with a flat CSV implementation and an in-memory one
//! - **Validation**: `RecordValidator` for entries coming from the form
//! - **Filter Engine**: person / instrument / date-range queries over a loaded store
//! - **Export**: spreadsheet, text report and JSON artifacts of a filtered view
//! - **Import**: bulk load of externally authored sheets
//!
//! ```text
//!  form / sheet ──► IssueService ──► RecordStore (CSV file | memory)
//!                        │
//!                        ▼
//!             prune ─► filter ─► Exporter ──► file
//! ```

pub mod error;
pub mod export;
pub mod filter;
pub mod import;
mod rows;
pub mod service;
pub mod store;
pub mod types;
pub mod validator;

pub use error::{TrackerError, TrackerResult};
pub use export::{ExportOutcome, Exporter, ReportRenderer};
pub use filter::{
    apply, default_date_range, prune_undated, sort_for_display, summarize, DateRange,
    FilterQuery, Pruned, Selection, Summary,
};
pub use import::{read_sheet, ImportedSheet};
pub use service::{ImportSummary, IssueService, Submission};
pub use store::{CsvRecordStore, InMemoryRecordStore, RecordStore};
pub use types::{DateField, NewRecord, Record, STORE_COLUMNS};
pub use validator::{RecordRejection, RecordValidation, RecordValidator};
