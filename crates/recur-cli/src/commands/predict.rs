//! Predict command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use recur_core::{predict_bills, BillPrediction};

use super::{run_detection, truncate, DetectOverrides};

/// Parse `--today`, falling back to the local date
pub fn parse_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --today format (use YYYY-MM-DD)"),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Detect patterns in `file` and return the bills due in the window
pub fn upcoming_bills(
    config_path: Option<&Path>,
    file: &Path,
    days: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<BillPrediction>> {
    let (detector, report) = run_detection(config_path, file, &DetectOverrides::default())?;
    match days {
        Some(days) if days < 0 => anyhow::bail!("--days must not be negative"),
        Some(days) => Ok(predict_bills(&report.patterns, today, days)),
        None => Ok(detector.predict(&report.patterns, today)),
    }
}

pub fn cmd_predict(
    config_path: Option<&Path>,
    file: &Path,
    days: Option<i64>,
    today: Option<&str>,
    json: bool,
) -> Result<()> {
    let today = parse_today(today)?;
    let bills = upcoming_bills(config_path, file, days, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&bills)?);
        return Ok(());
    }

    if bills.is_empty() {
        println!("No bills expected in the look-ahead window.");
        return Ok(());
    }

    println!();
    println!("📅 Upcoming Bills (from {})", today);
    println!("   ─────────────────────────────────────────────────────────────");

    for bill in &bills {
        let days_out = (bill.expected_date - today).num_days();
        println!(
            "   {} (in {:>2}d) │ {:24} │ {:>19} │ {:<9} │ {:>3.0}%",
            bill.expected_date,
            days_out,
            truncate(&bill.merchant_name, 24),
            bill.expected_amount.to_string(),
            bill.cadence.as_str(),
            bill.confidence * 100.0
        );
    }

    Ok(())
}
