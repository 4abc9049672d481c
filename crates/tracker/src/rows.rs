//! CSV row codec shared by the flat-file store and the bulk importer.

use crate::error::{TrackerError, TrackerResult};
use crate::types::{DateField, Record, STORE_COLUMNS};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One sheet row as text, keyed by the store column headers.
///
/// Only `Issue Date` is mandatory; sheets authored elsewhere may omit the rest.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct RawRow {
    #[serde(rename = "Instrument", default)]
    pub instrument: String,
    #[serde(rename = "Quantity", default)]
    pub quantity: String,
    #[serde(rename = "Issue Date")]
    pub issue_date: String,
    #[serde(rename = "Return Date", default)]
    pub return_date: String,
    #[serde(rename = "Issued To", default)]
    pub issued_to: String,
}

impl RawRow {
    pub fn from_record(record: &Record) -> Self {
        Self {
            instrument: record.instrument.clone(),
            quantity: record.quantity.to_string(),
            issue_date: record.issue_date.to_cell(),
            return_date: record.return_date.to_cell(),
            issued_to: record.issued_to.clone(),
        }
    }

    pub fn into_record(self, date_formats: &[String]) -> Result<Record, String> {
        let quantity = parse_quantity(&self.quantity)?;
        Ok(Record {
            instrument: self.instrument,
            quantity,
            issue_date: DateField::parse(&self.issue_date, date_formats),
            return_date: DateField::parse(&self.return_date, date_formats),
            issued_to: self.issued_to,
        })
    }
}

/// Integer quantity; spreadsheets often hand back whole numbers as `2.0`.
/// A blank cell reads as zero.
fn parse_quantity(text: &str) -> Result<u32, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    if let Ok(q) = text.parse::<u32>() {
        return Ok(q);
    }
    match text.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) => Ok(f as u32),
        _ => Err(format!("quantity '{}' is not a whole number", text)),
    }
}

/// A decoded data row, or the reason it could not be decoded.
#[derive(Debug)]
pub(crate) struct DecodedRow {
    /// 1-based line number in the source, header included.
    pub line: u64,
    pub result: Result<Record, String>,
}

/// Decode every data row of a sheet. Header-level problems fail the whole read.
pub(crate) fn decode_rows<R: Read>(reader: R, date_formats: &[String]) -> TrackerResult<Vec<DecodedRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if !headers.iter().any(|h| h == "Issue Date") {
        return Err(TrackerError::Serialization(
            "missing required column 'Issue Date'".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (idx, raw) in rdr.records().enumerate() {
        // Quoted cells may span lines, so prefer the reader's own position.
        let fallback = idx as u64 + 2;
        let (line, result) = match raw {
            Ok(raw) => (
                raw.position().map_or(fallback, |p| p.line()),
                raw.deserialize::<RawRow>(Some(&headers))
                    .map_err(|e| e.to_string())
                    .and_then(|row| row.into_record(date_formats)),
            ),
            Err(e) => (
                e.position().map_or(fallback, |p| p.line()),
                Err(e.to_string()),
            ),
        };
        rows.push(DecodedRow { line, result });
    }
    Ok(rows)
}

/// Encode records under the five-column header. An empty slice yields the header alone.
pub(crate) fn encode_rows(records: &[Record]) -> TrackerResult<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(STORE_COLUMNS)?;
    for record in records {
        wtr.serialize(RawRow::from_record(record))?;
    }

    wtr.into_inner()
        .map_err(|e| TrackerError::Serialization(e.to_string()))
}
