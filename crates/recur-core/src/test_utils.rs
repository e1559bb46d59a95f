//! Test utilities for building transaction fixtures

use chrono::{Duration, Months, NaiveDate};

use crate::models::{Transaction, TransactionRecord};

/// Parse a YYYY-MM-DD date, panicking on bad fixtures
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture date must be YYYY-MM-DD")
}

pub fn tx(id: &str, description: &str, amount: f64, on: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        merchant_description: description.to_string(),
        amount,
        date: date(on),
    }
}

pub fn record(id: &str, description: &str, amount: f64, on: &str) -> TransactionRecord {
    TransactionRecord::new(id, description, amount, date(on))
}

/// One record per calendar month starting at `start`, one per amount
pub fn monthly_series(description: &str, amounts: &[f64], start: &str) -> Vec<TransactionRecord> {
    let start = date(start);
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let on = start
                .checked_add_months(Months::new(i as u32))
                .expect("fixture date in range");
            TransactionRecord::new(format!("{}-{}", description, i), description, *amount, on)
        })
        .collect()
}

/// One record every `every_days` days starting at `start`, one per amount
pub fn interval_series(
    description: &str,
    amounts: &[f64],
    start: &str,
    every_days: i64,
) -> Vec<TransactionRecord> {
    let start = date(start);
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let on = start + Duration::days(every_days * i as i64);
            TransactionRecord::new(format!("{}-{}", description, i), description, *amount, on)
        })
        .collect()
}

/// Validated transactions from complete fixture records
pub fn transactions(records: &[TransactionRecord]) -> Vec<Transaction> {
    records
        .iter()
        .map(|r| r.validate().expect("fixture record must be complete"))
        .collect()
}
