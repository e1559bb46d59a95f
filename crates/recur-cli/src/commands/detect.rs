//! Detect command implementation

use std::path::Path;

use anyhow::Result;
use recur_core::{DetectionConfig, DetectionReport, PatternType, RecurringDetector, RecurringPattern};

use super::{load_config, load_records, truncate};

/// Command-line overrides applied on top of the loaded config
#[derive(Debug, Default, Clone, Copy)]
pub struct DetectOverrides {
    pub min_occurrences: Option<usize>,
    pub threshold: Option<u8>,
    pub workers: Option<usize>,
}

impl DetectOverrides {
    pub fn apply(&self, mut config: DetectionConfig) -> DetectionConfig {
        if let Some(min) = self.min_occurrences {
            config.min_occurrences = min;
        }
        if let Some(threshold) = self.threshold {
            config.fuzzy_similarity_threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.worker_threads = workers;
        }
        config
    }
}

/// Load records and run detection with the given overrides
pub fn run_detection(
    config_path: Option<&Path>,
    file: &Path,
    overrides: &DetectOverrides,
) -> Result<(RecurringDetector, DetectionReport)> {
    let config = overrides.apply(load_config(config_path)?);
    let detector = RecurringDetector::new(config)?;
    let records = load_records(file)?;
    let report = detector.detect(&records);
    Ok((detector, report))
}

pub fn cmd_detect(
    config_path: Option<&Path>,
    file: &Path,
    overrides: &DetectOverrides,
    json: bool,
) -> Result<()> {
    let (_, report) = run_detection(config_path, file, overrides)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🔍 Detecting recurring patterns in {}...", file.display());

    if report.patterns.is_empty() {
        println!();
        println!("No recurring patterns found.");
    } else {
        println!();
        println!("🔁 Recurring Patterns");
        println!("   ─────────────────────────────────────────────────────────────");

        for pattern in &report.patterns {
            println!(
                "   {} {:24} │ {:>19} │ {:<9} │ {:>3.0}% │ next {}",
                pattern_icon(pattern.pattern_type),
                truncate(&pattern.merchant_name, 24),
                format_amount(pattern),
                pattern.cadence.as_str(),
                pattern.confidence * 100.0,
                pattern.next_expected_date
            );
        }
    }

    let stats = &report.stats;
    println!();
    println!("📊 Detection Summary");
    println!("   ─────────────────────────────");
    println!("   Records received: {}", stats.records_received);
    println!("   Merchant groups evaluated: {}", stats.total_groups_evaluated);
    println!(
        "   Patterns: {} fixed, {} variable, {} irregular",
        stats.fixed_patterns, stats.variable_patterns, stats.irregular_patterns
    );
    println!(
        "   False positives filtered: {} ({:.0}%)",
        stats.false_positives_filtered,
        stats.false_positive_rate() * 100.0
    );
    if stats.generic_excluded > 0 {
        println!("   Generic descriptors excluded: {}", stats.generic_excluded);
    }
    if stats.refunds_excluded > 0 {
        println!("   Refunds excluded: {}", stats.refunds_excluded);
    }

    if !report.warnings.is_empty() {
        println!();
        println!("⚠️  {} records skipped:", report.warnings.len());
        for warning in report.warnings.iter().take(10) {
            println!("   {} ({})", truncate(&warning.record_id, 16), warning.kind);
        }
        if report.warnings.len() > 10 {
            println!("   ... and {} more", report.warnings.len() - 10);
        }
    }

    Ok(())
}

fn pattern_icon(pattern_type: PatternType) -> &'static str {
    match pattern_type {
        PatternType::Fixed => "📌",
        PatternType::Variable => "📈",
        PatternType::Irregular => "📅",
    }
}

/// Exact amount or expected range for display
pub fn format_amount(pattern: &RecurringPattern) -> String {
    match (pattern.amount, pattern.amount_range) {
        (_, Some((min, max))) => format!("${:.2} to ${:.2}", min, max),
        (Some(amount), None) => format!("${:.2}", amount),
        (None, None) => "?".to_string(),
    }
}
