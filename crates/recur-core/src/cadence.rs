//! Cadence analysis
//!
//! Estimates the recurrence interval of an ascending date series from the
//! median day gap, which tolerates a single late or early charge.

use chrono::{Duration, NaiveDate};

use crate::models::Cadence;
use crate::stats::{median, sample_std_dev};

/// Interval statistics for a date series that matched a cadence bucket
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceAnalysis {
    pub cadence: Cadence,
    pub median_interval_days: f64,
    /// Sample standard deviation of the gaps; 0 with a single gap
    pub date_std_dev: f64,
}

impl CadenceAnalysis {
    /// `from` plus the median interval, rounded to whole days
    pub fn next_after(&self, from: NaiveDate) -> NaiveDate {
        from + Duration::days(self.median_interval_days.round() as i64)
    }
}

/// Day gaps between successive dates
pub fn day_gaps(dates: &[NaiveDate]) -> Vec<f64> {
    dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect()
}

/// Classify an ascending date series.
///
/// Returns `None` when there are fewer than two dates or the median gap falls
/// outside every cadence bucket. That is the common case for one-off
/// merchants, not an error.
pub fn analyze_cadence(dates: &[NaiveDate]) -> Option<CadenceAnalysis> {
    if dates.len() < 2 {
        return None;
    }

    let gaps = day_gaps(dates);
    let median_interval_days = median(&gaps);
    let cadence = Cadence::from_median_days(median_interval_days)?;

    Some(CadenceAnalysis {
        cadence,
        median_interval_days,
        date_std_dev: sample_std_dev(&gaps),
    })
}
