//! Core domain types for issue records.
//!
//! - `Record`: one instrument-issue event as stored
//! - `NewRecord`: a candidate submitted through the entry form
//! - `DateField`: a calendar date that may have failed to parse

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Store columns, in field order. Also the spreadsheet header.
pub const STORE_COLUMNS: [&str; 5] = [
    "Instrument",
    "Quantity",
    "Issue Date",
    "Return Date",
    "Issued To",
];

/// Date format used whenever a date is written back out.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// A date cell after parsing: either a calendar date or absent.
///
/// Malformed date text degrades to `Absent` instead of failing the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Valid(NaiveDate),
    Absent,
}

impl DateField {
    /// Parse date text using each format in turn. Empty or unparseable text is `Absent`.
    pub fn parse(text: &str, formats: &[String]) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return DateField::Absent;
        }

        formats
            .iter()
            .find_map(|fmt| {
                NaiveDate::parse_from_str(text, fmt)
                    .or_else(|_| NaiveDateTime::parse_from_str(text, fmt).map(|dt| dt.date()))
                    .ok()
            })
            .map(DateField::Valid)
            .unwrap_or(DateField::Absent)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateField::Valid(d) => Some(*d),
            DateField::Absent => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, DateField::Valid(_))
    }

    /// Text written to a store or spreadsheet cell.
    pub fn to_cell(&self) -> String {
        match self {
            DateField::Valid(d) => d.format(ISO_DATE).to_string(),
            DateField::Absent => String::new(),
        }
    }
}

impl From<NaiveDate> for DateField {
    fn from(date: NaiveDate) -> Self {
        DateField::Valid(date)
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Valid(d) => write!(f, "{}", d.format(ISO_DATE)),
            DateField::Absent => write!(f, "n/a"),
        }
    }
}

impl Serialize for DateField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DateField::Valid(d) => serializer.serialize_some(&d.format(ISO_DATE).to_string()),
            DateField::Absent => serializer.serialize_none(),
        }
    }
}

/// One instrument-issue event. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub instrument: String,
    pub quantity: u32,
    pub issue_date: DateField,
    pub return_date: DateField,
    pub issued_to: String,
}

impl Record {
    pub fn new(
        instrument: impl Into<String>,
        quantity: u32,
        issue_date: impl Into<DateField>,
        return_date: impl Into<DateField>,
        issued_to: impl Into<String>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            quantity,
            issue_date: issue_date.into(),
            return_date: return_date.into(),
            issued_to: issued_to.into(),
        }
    }

    /// Single report line, e.g. `2024-03-01 - Lux Meter x2 issued to Asha (Return by 2024-03-10)`.
    pub fn report_line(&self) -> String {
        format!(
            "{} - {} x{} issued to {} (Return by {})",
            self.issue_date, self.instrument, self.quantity, self.issued_to, self.return_date
        )
    }
}

/// A record candidate as entered on the form, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub instrument: String,
    pub quantity: u32,
    pub issue_date: NaiveDate,
    pub return_date: NaiveDate,
    pub issued_to: String,
}

impl NewRecord {
    /// Convert into a storable record, trimming the free-text name.
    pub fn into_record(self) -> Record {
        Record {
            instrument: self.instrument,
            quantity: self.quantity,
            issue_date: DateField::Valid(self.issue_date),
            return_date: DateField::Valid(self.return_date),
            issued_to: self.issued_to.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        config::default_date_formats()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_field_parse() {
        assert_eq!(DateField::parse("2024-03-01", &formats()), DateField::Valid(ymd(2024, 3, 1)));
        assert_eq!(
            DateField::parse("2024-03-01 00:00:00", &formats()),
            DateField::Valid(ymd(2024, 3, 1))
        );
        assert_eq!(DateField::parse("15/04/2024", &formats()), DateField::Valid(ymd(2024, 4, 15)));
        assert_eq!(DateField::parse("  ", &formats()), DateField::Absent);
        assert_eq!(DateField::parse("next tuesday", &formats()), DateField::Absent);
        assert_eq!(DateField::parse("2024-02-30", &formats()), DateField::Absent);
    }

    #[test]
    fn test_date_field_rendering() {
        let valid = DateField::Valid(ymd(2024, 3, 10));
        assert_eq!(valid.to_string(), "2024-03-10");
        assert_eq!(valid.to_cell(), "2024-03-10");
        assert_eq!(DateField::Absent.to_string(), "n/a");
        assert_eq!(DateField::Absent.to_cell(), "");
        assert_eq!(serde_json::to_string(&DateField::Absent).unwrap(), "null");
        assert_eq!(serde_json::to_string(&valid).unwrap(), "\"2024-03-10\"");
    }

    #[test]
    fn test_report_line() {
        let record = Record::new("Lux Meter", 2, ymd(2024, 3, 1), ymd(2024, 3, 10), "Asha");
        assert_eq!(
            record.report_line(),
            "2024-03-01 - Lux Meter x2 issued to Asha (Return by 2024-03-10)"
        );
    }

    #[test]
    fn test_new_record_trims_name() {
        let candidate = NewRecord {
            instrument: "eGauge".to_string(),
            quantity: 1,
            issue_date: ymd(2024, 5, 2),
            return_date: ymd(2024, 5, 9),
            issued_to: "  Raj ".to_string(),
        };
        assert_eq!(candidate.into_record().issued_to, "Raj");
    }
}
