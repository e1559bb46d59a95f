//! Record loading from CSV and JSON files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::TransactionRecord;

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
struct Columns {
    id: Option<usize>,
    description: usize,
    amount: usize,
    date: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let description = find(&["description", "merchant", "merchant_description"])
            .ok_or_else(|| Error::Import("Missing description column".into()))?;
        let amount =
            find(&["amount"]).ok_or_else(|| Error::Import("Missing amount column".into()))?;
        let date = find(&["date"]).ok_or_else(|| Error::Import("Missing date column".into()))?;

        Ok(Self {
            id: find(&["id"]),
            description,
            amount,
            date,
        })
    }
}

/// Parse CSV with a header row into records.
///
/// Cells that fail to parse become `None` so detection can report them as
/// warnings. Invalid UTF-8 is replaced with U+FFFD. Only a missing column or
/// an I/O failure is an error.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = StringRecord::from_byte_record_lossy(rdr.byte_headers()?.clone());
    let columns = Columns::from_headers(&headers)?;
    let mut records = Vec::new();

    for (row, result) in rdr.byte_records().enumerate() {
        let bytes = result?;
        if std::str::from_utf8(bytes.as_slice()).is_err() {
            warn!("Row {}: invalid UTF-8 replaced", row + 1);
        }
        let record = StringRecord::from_byte_record_lossy(bytes);

        let description = record.get(columns.description).unwrap_or("").to_string();
        let amount = record.get(columns.amount).and_then(|s| match parse_amount(s) {
            Ok(amount) => Some(amount),
            Err(e) => {
                debug!("Row {}: {}", row + 1, e);
                None
            }
        });
        let date = record.get(columns.date).and_then(|s| match parse_date(s) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!("Row {}: {}", row + 1, e);
                None
            }
        });

        let id = columns
            .id
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| generate_id(row, date, &description, amount));

        records.push(TransactionRecord {
            id,
            merchant_description: description,
            amount,
            date,
        });
    }

    debug!("Parsed {} CSV records", records.len());
    Ok(records)
}

/// Parse a JSON array of records
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut records: Vec<TransactionRecord> = serde_json::from_reader(reader)?;
    for (row, record) in records.iter_mut().enumerate() {
        if record.id.is_empty() {
            record.id = generate_id(
                row,
                record.date,
                &record.merchant_description,
                record.amount,
            );
        }
    }
    Ok(records)
}

/// Load records from a `.csv` or `.json` file
pub fn load_records(path: &Path) -> Result<Vec<TransactionRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let file = BufReader::new(File::open(path)?);
    match extension.as_deref() {
        Some("csv") => parse_csv(file),
        Some("json") => parse_json(file),
        _ => Err(Error::Import(format!(
            "Unsupported file type: {} (expected .csv or .json)",
            path.display()
        ))),
    }
}

/// Stable id for a record that arrived without one
fn generate_id(
    row: usize,
    date: Option<NaiveDate>,
    description: &str,
    amount: Option<f64>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(row.to_be_bytes());
    if let Some(date) = date {
        hasher.update(date.to_string().as_bytes());
    }
    hasher.update(description.as_bytes());
    if let Some(amount) = amount {
        hasher.update(amount.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {}", s)))
}
