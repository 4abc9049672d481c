//! Filter engine: pruning, filter queries and presentation helpers.
//!
//! Everything here is a pure function of its inputs. Filtering never
//! reorders records; only [`sort_for_display`] does, and it works on a copy.

use crate::types::{DateField, Record};
use chrono::{Datelike, Months, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Literal that selects every value in a person or instrument filter.
pub const ALL: &str = "All";

/// Exact-match selection, or no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Exact(String),
}

impl Selection {
    /// Parse a filter value; the literal `All` selects everything.
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Exact(value.to_string())
        }
    }

    pub fn admits(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Exact(wanted) => wanted == value,
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.map(|v| Selection::parse(&v)).unwrap_or_default()
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::parse(value)
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// First to last day of the month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(date);
        Self { start, end }
    }

    /// An absent date is never inside any range.
    pub fn contains(&self, date: &DateField) -> bool {
        match date {
            DateField::Valid(d) => self.start <= *d && *d <= self.end,
            DateField::Absent => false,
        }
    }

    pub fn is_single_month(&self) -> bool {
        self.start.year() == self.end.year() && self.start.month() == self.end.month()
    }

    /// `March 2024`, or `2024-03-01 to 2024-05-31` when the range spans months.
    pub fn label(&self) -> String {
        if self.is_single_month() {
            self.start.format("%B %Y").to_string()
        } else {
            format!(
                "{} to {}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            )
        }
    }

    /// Year-month token for file names: `2024_03` or `2024_03-2024_05`.
    pub fn file_token(&self) -> String {
        if self.is_single_month() {
            self.start.format("%Y_%m").to_string()
        } else {
            format!("{}-{}", self.start.format("%Y_%m"), self.end.format("%Y_%m"))
        }
    }
}

/// Person, instrument and date-range predicates, ANDed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub person: Selection,
    pub instrument: Selection,
    /// `None` disables the date predicate.
    pub date_range: Option<DateRange>,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_person(mut self, person: impl Into<Selection>) -> Self {
        self.person = person.into();
        self
    }

    pub fn with_instrument(mut self, instrument: impl Into<Selection>) -> Self {
        self.instrument = instrument.into();
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Set the date range from optional bounds, filling gaps from [`default_date_range`].
    pub fn with_bounds(
        self,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
        records: &[Record],
        today: NaiveDate,
    ) -> Self {
        let defaults = default_date_range(records, today);
        self.with_date_range(DateRange::new(
            since.unwrap_or(defaults.start),
            until.unwrap_or(defaults.end),
        ))
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.person.admits(&record.issued_to)
            && self.instrument.admits(&record.instrument)
            && self
                .date_range
                .map_or(true, |range| range.contains(&record.issue_date))
    }
}

/// Records satisfying every active predicate, in their original order.
pub fn apply(records: &[Record], query: &FilterQuery) -> Vec<Record> {
    let view: Vec<Record> = records.iter().filter(|r| query.matches(r)).cloned().collect();
    debug!(total = records.len(), matched = view.len(), ?query, "Filter applied");
    view
}

/// `[min, max]` of the valid issue dates, or `[today, today]` when there are none.
pub fn default_date_range(records: &[Record], today: NaiveDate) -> DateRange {
    let mut dates = records.iter().filter_map(|r| r.issue_date.date());
    match dates.next() {
        Some(first) => {
            let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
            DateRange::new(min, max)
        }
        None => DateRange::new(today, today),
    }
}

/// Records kept after pruning, and how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    pub kept: Vec<Record>,
    pub dropped: usize,
}

/// Drop records whose issue date did not parse.
pub fn prune_undated(records: Vec<Record>) -> Pruned {
    let total = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| r.issue_date.is_valid())
        .collect();
    let dropped = total - kept.len();
    if dropped > 0 {
        debug!(dropped, "Pruned records without a valid issue date");
    }
    Pruned { kept, dropped }
}

/// Copy sorted by issue date, newest first. Ties keep store order; absent dates go last.
pub fn sort_for_display(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.issue_date.date().cmp(&a.issue_date.date()));
    sorted
}

/// Quantity totals over a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub total_quantity: u64,
    pub by_instrument: BTreeMap<String, u64>,
    pub by_person: BTreeMap<String, u64>,
}

pub fn summarize(view: &[Record]) -> Summary {
    let mut summary = Summary {
        records: view.len(),
        ..Summary::default()
    };
    for record in view {
        let qty = u64::from(record.quantity);
        summary.total_quantity += qty;
        *summary
            .by_instrument
            .entry(record.instrument.clone())
            .or_default() += qty;
        *summary.by_person.entry(record.issued_to.clone()).or_default() += qty;
    }
    summary
}
