//! Recurring pattern detection
//!
//! Drives the pipeline end to end:
//! records → validation → merchant grouping → per group: cadence → layered
//! detectors → confidence → false-positive filter → sorted patterns + stats.
//!
//! Groups are independent, so with `worker_threads > 1` they are evaluated on
//! a fixed-size rayon pool and merged at the final sort. Statistics are
//! tallied from the per-group outcomes of each call.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cadence::analyze_cadence;
use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::layers::{default_layers, first_match, AmountProfile, DetectionLayer};
use crate::models::{
    BillPrediction, DataWarning, DetectionReport, DetectionStats, ExpectedAmount, PatternType,
    RecurringPattern, Transaction, TransactionRecord, WarningKind,
};
use crate::normalize::{MerchantGroup, MerchantNormalizer, MerchantResolver};
use crate::scoring::{confidence_score, filter_candidate, ScoreFactors};

/// What happened to one merchant group
#[derive(Debug)]
enum GroupOutcome {
    Pattern(RecurringPattern),
    NoCadence,
    NoLayerMatched,
    Filtered,
}

#[derive(Debug)]
struct GroupEvaluation {
    outcome: GroupOutcome,
    refunds_excluded: usize,
}

/// Main detector that runs the layered pipeline
pub struct RecurringDetector {
    config: DetectionConfig,
    normalizer: MerchantNormalizer,
    layers: Vec<Box<dyn DetectionLayer>>,
    resolver: Option<Box<dyn MerchantResolver>>,
    pool: Option<rayon::ThreadPool>,
}

impl RecurringDetector {
    /// Validates the configuration and builds the worker pool if requested
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = MerchantNormalizer::new(&config)?;

        let pool = if config.worker_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("recur-worker-{}", i))
                .build()
                .map_err(|e| Error::Config(format!("Failed to start worker pool: {}", e)))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            config,
            normalizer,
            layers: default_layers(),
            resolver: None,
            pool,
        })
    }

    /// Replace the detection layers (tried in the given order)
    pub fn with_layers(mut self, layers: Vec<Box<dyn DetectionLayer>>) -> Self {
        self.layers = layers;
        self
    }

    /// Install an external merchant resolver that overrides normalization
    pub fn with_resolver(mut self, resolver: Box<dyn MerchantResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &MerchantNormalizer {
        &self.normalizer
    }

    /// Detect recurring patterns in a batch of raw records.
    ///
    /// Malformed records are skipped and reported as warnings; they never
    /// abort the batch.
    pub fn detect(&self, records: &[TransactionRecord]) -> DetectionReport {
        let mut warnings = Vec::new();
        let mut transactions = Vec::with_capacity(records.len());

        for record in records {
            match record.validate() {
                Ok(tx) => transactions.push(tx),
                Err(kind) => {
                    debug!("Skipping record '{}': {}", record.id, kind);
                    warnings.push(DataWarning {
                        record_id: record.id.clone(),
                        kind,
                    });
                }
            }
        }

        if !warnings.is_empty() {
            warn!("Skipped {} malformed records", warnings.len());
        }

        let mut report = self.run(&transactions, warnings);
        report.stats.records_received = records.len();
        report
    }

    /// Detect recurring patterns in already-validated transactions
    pub fn detect_transactions(&self, transactions: &[Transaction]) -> DetectionReport {
        let mut report = self.run(transactions, Vec::new());
        report.stats.records_received = transactions.len();
        report
    }

    /// Upcoming bills within the configured look-ahead window
    pub fn predict(&self, patterns: &[RecurringPattern], today: NaiveDate) -> Vec<BillPrediction> {
        predict_bills(patterns, today, self.config.lookahead_days)
    }

    fn run(&self, transactions: &[Transaction], mut warnings: Vec<DataWarning>) -> DetectionReport {
        let grouping = self
            .normalizer
            .group(transactions, self.resolver.as_deref());

        for id in grouping.unidentified {
            warnings.push(DataWarning {
                record_id: id,
                kind: WarningKind::UnidentifiableMerchant,
            });
        }

        let evaluations: Vec<GroupEvaluation> = match &self.pool {
            Some(pool) => pool.install(|| {
                grouping
                    .groups
                    .par_iter()
                    .map(|group| self.evaluate_group(group))
                    .collect()
            }),
            None => grouping
                .groups
                .iter()
                .map(|group| self.evaluate_group(group))
                .collect(),
        };

        let mut stats = DetectionStats {
            records_skipped: warnings.len(),
            generic_excluded: grouping.generic_excluded,
            total_groups_evaluated: evaluations.len(),
            ..Default::default()
        };
        let mut patterns = Vec::new();

        for evaluation in evaluations {
            stats.refunds_excluded += evaluation.refunds_excluded;
            match evaluation.outcome {
                GroupOutcome::Pattern(pattern) => {
                    stats.record_pattern(pattern.pattern_type);
                    patterns.push(pattern);
                }
                GroupOutcome::NoCadence => stats.no_cadence += 1,
                GroupOutcome::NoLayerMatched => stats.no_layer_matched += 1,
                GroupOutcome::Filtered => stats.false_positives_filtered += 1,
            }
        }

        patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| b.occurrence_count.cmp(&a.occurrence_count))
                .then_with(|| a.normalized_key.cmp(&b.normalized_key))
        });

        info!(
            "Detection complete: {} groups, {} fixed, {} variable, {} irregular, {} filtered",
            stats.total_groups_evaluated,
            stats.fixed_patterns,
            stats.variable_patterns,
            stats.irregular_patterns,
            stats.false_positives_filtered
        );

        DetectionReport {
            patterns,
            stats,
            warnings,
        }
    }

    fn evaluate_group(&self, group: &MerchantGroup) -> GroupEvaluation {
        let (kept, refunds_excluded) = dominant_sign(&group.transactions);
        let outcome = self.classify(group, &kept);
        GroupEvaluation {
            outcome,
            refunds_excluded,
        }
    }

    fn classify(&self, group: &MerchantGroup, transactions: &[&Transaction]) -> GroupOutcome {
        let dates: Vec<NaiveDate> = transactions.iter().map(|t| t.date).collect();
        let Some(cadence) = analyze_cadence(&dates) else {
            debug!("No cadence for '{}' ({} transactions)", group.key, dates.len());
            return GroupOutcome::NoCadence;
        };

        let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();
        let profile = AmountProfile::from_amounts(&amounts);
        let Some(candidate) = first_match(&self.layers, &profile, &cadence, &self.config) else {
            debug!("No layer accepted '{}' ({})", group.key, cadence.cadence);
            return GroupOutcome::NoLayerMatched;
        };

        // Slices are non-empty once a cadence was found
        let (first_date, last_date) = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return GroupOutcome::NoCadence,
        };

        let sign = if amounts.iter().any(|a| *a < 0.0) {
            -1.0
        } else {
            1.0
        };
        let amount = candidate.amount.map(|a| round_cents(a * sign));
        let amount_range = candidate.amount_range.map(|(low, high)| {
            let (a, b) = (round_cents(low * sign), round_cents(high * sign));
            (a.min(b), a.max(b))
        });

        let occurrence_count = transactions.len();
        let confidence = confidence_score(
            &ScoreFactors {
                pattern_type: candidate.pattern_type,
                occurrence_count,
                date_std_dev: cadence.date_std_dev,
                amount_variance_pct: candidate.amount_variance_pct,
                flagged_generic: self.normalizer.mentions_generic(&group.key),
            },
            &self.config,
        );

        let reasoning = format!(
            "{} {} pattern over {} occurrences: {}; median interval {:.1} days (std dev {:.1})",
            capitalize(candidate.pattern_type.as_str()),
            cadence.cadence,
            occurrence_count,
            candidate.rationale,
            cadence.median_interval_days,
            cadence.date_std_dev
        );

        let pattern = RecurringPattern {
            merchant_name: group.representative_name().to_string(),
            normalized_key: group.key.clone(),
            pattern_type: candidate.pattern_type,
            cadence: cadence.cadence,
            amount,
            amount_range,
            amount_variance_pct: candidate.amount_variance_pct,
            occurrence_count,
            first_date,
            last_date,
            next_expected_date: cadence.next_after(last_date),
            median_interval_days: cadence.median_interval_days,
            date_std_dev: cadence.date_std_dev,
            confidence,
            reasoning,
        };

        if let Some(reason) = filter_candidate(
            &pattern,
            candidate.min_occurrences,
            self.normalizer.is_generic(&group.key),
            &self.config,
        ) {
            debug!(
                "Filtered '{}' as false positive: {} (confidence {:.2})",
                group.key, reason, pattern.confidence
            );
            return GroupOutcome::Filtered;
        }

        debug!(
            "Found {} pattern: {} @ {:?}/{} (confidence {:.2})",
            pattern.pattern_type, pattern.normalized_key, pattern.amount, pattern.cadence, confidence
        );
        GroupOutcome::Pattern(pattern)
    }
}

/// Keep the majority sign of a group; ties keep the sign of the latest record.
///
/// Returns the kept transactions and how many were dropped.
fn dominant_sign(transactions: &[Transaction]) -> (Vec<&Transaction>, usize) {
    let negatives = transactions.iter().filter(|t| t.amount < 0.0).count();
    let positives = transactions.len() - negatives;
    if negatives == 0 || positives == 0 {
        return (transactions.iter().collect(), 0);
    }

    let keep_negative = match negatives.cmp(&positives) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => transactions.last().is_some_and(|t| t.amount < 0.0),
    };

    let kept: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| (t.amount < 0.0) == keep_negative)
        .collect();
    let dropped = transactions.len() - kept.len();
    (kept, dropped)
}

/// Upcoming bills expected within `lookahead_days` of `today`.
///
/// A pattern whose next date has already passed is rolled forward by its
/// median interval until it lands on or after `today`. A window reaching past
/// the last representable date ends there; a pattern that cannot be rolled
/// forward that far is omitted.
pub fn predict_bills(
    patterns: &[RecurringPattern],
    today: NaiveDate,
    lookahead_days: i64,
) -> Vec<BillPrediction> {
    let window_end = Duration::try_days(lookahead_days)
        .and_then(|window| today.checked_add_signed(window))
        .unwrap_or(NaiveDate::MAX);
    let mut predictions: Vec<BillPrediction> = patterns
        .iter()
        .filter_map(|pattern| {
            let expected_amount = match (pattern.pattern_type, pattern.amount_range, pattern.amount)
            {
                (PatternType::Variable, Some((min, max)), _) => ExpectedAmount::Range { min, max },
                (_, _, Some(amount)) => ExpectedAmount::Exact { amount },
                _ => return None,
            };

            let step_days = (pattern.median_interval_days.round() as i64).max(1);
            let behind = (today - pattern.next_expected_date).num_days();
            let expected_date = if behind > 0 {
                // Whole intervals needed to land on or after today
                let steps = (behind + step_days - 1) / step_days;
                let advance = Duration::try_days(steps.checked_mul(step_days)?)?;
                pattern.next_expected_date.checked_add_signed(advance)?
            } else {
                pattern.next_expected_date
            };
            if expected_date > window_end {
                return None;
            }

            Some(BillPrediction {
                merchant_name: pattern.merchant_name.clone(),
                normalized_key: pattern.normalized_key.clone(),
                expected_date,
                expected_amount,
                confidence: pattern.confidence,
                cadence: pattern.cadence,
            })
        })
        .collect();

    predictions.sort_by(|a, b| {
        a.expected_date
            .cmp(&b.expected_date)
            .then_with(|| a.normalized_key.cmp(&b.normalized_key))
    });
    predictions
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cadence;
    use crate::test_utils::{date, interval_series, monthly_series, record, transactions, tx};

    fn detector() -> RecurringDetector {
        RecurringDetector::new(DetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = DetectionConfig {
            min_occurrences: 1,
            ..Default::default()
        };
        assert!(matches!(
            RecurringDetector::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_fixed_monthly_netflix() {
        let records = vec![
            record("1", "Netflix", 15.99, "2025-01-15"),
            record("2", "Netflix", 15.99, "2025-02-15"),
            record("3", "Netflix", 15.99, "2025-03-15"),
        ];

        let report = detector().detect(&records);
        assert_eq!(report.patterns.len(), 1);

        let pattern = &report.patterns[0];
        assert_eq!(pattern.pattern_type, PatternType::Fixed);
        assert_eq!(pattern.cadence, Cadence::Monthly);
        assert_eq!(pattern.amount, Some(15.99));
        assert!(pattern.amount_range.is_none());
        assert!(pattern.confidence >= 0.90);
        assert_eq!(pattern.first_date, date("2025-01-15"));
        assert_eq!(pattern.last_date, date("2025-03-15"));
        assert_eq!(pattern.next_expected_date, date("2025-04-14"));
        assert_eq!(report.stats.fixed_patterns, 1);
    }

    #[test]
    fn test_negative_charges_keep_sign() {
        let records = monthly_series("SPOTIFY USA", &[-10.99, -10.99, -10.99, -10.99], "2025-01-20");
        let report = detector().detect(&records);
        assert_eq!(report.patterns.len(), 1);
        assert_eq!(report.patterns[0].amount, Some(-10.99));
        assert_eq!(report.patterns[0].normalized_key, "spotify");
    }

    #[test]
    fn test_refund_excluded_from_group() {
        let mut records =
            monthly_series("ADOBE CREATIVE CLOUD", &[-54.99, -54.99, -54.99, -54.99], "2025-01-03");
        records.push(record("refund", "ADOBE CREATIVE CLOUD", 54.99, "2025-02-10"));

        let report = detector().detect(&records);
        assert_eq!(report.stats.refunds_excluded, 1);
        assert_eq!(report.patterns.len(), 1);
        assert_eq!(report.patterns[0].occurrence_count, 4);
        assert_eq!(report.patterns[0].pattern_type, PatternType::Fixed);
    }

    #[test]
    fn test_dominant_sign_tie_keeps_latest() {
        let transactions = vec![
            tx("1", "X", -5.0, "2025-01-01"),
            tx("2", "X", 5.0, "2025-02-01"),
        ];
        let (kept, dropped) = dominant_sign(&transactions);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].id, "2");
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let mut records = monthly_series("HULU", &[17.99, 17.99, 17.99], "2025-01-01");
        records.push(TransactionRecord {
            id: "no-date".into(),
            merchant_description: "HULU".into(),
            amount: Some(17.99),
            date: None,
        });
        records.push(TransactionRecord {
            id: "no-amount".into(),
            merchant_description: "HULU".into(),
            amount: None,
            date: Some(date("2025-04-01")),
        });
        records.push(record("digits", "#000123", 4.00, "2025-01-09"));

        let report = detector().detect(&records);
        assert_eq!(report.patterns.len(), 1);
        assert_eq!(report.stats.records_received, 6);
        assert_eq!(report.stats.records_skipped, 3);

        let kinds: Vec<WarningKind> = report.warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::MissingDate,
                WarningKind::MissingAmount,
                WarningKind::UnidentifiableMerchant
            ]
        );
    }

    #[test]
    fn test_generic_descriptors_excluded() {
        let records = monthly_series("ATM WITHDRAWAL", &[100.0, 100.0, 100.0], "2025-01-05");
        let report = detector().detect(&records);
        assert!(report.patterns.is_empty());
        assert_eq!(report.stats.generic_excluded, 3);
        assert_eq!(report.stats.total_groups_evaluated, 0);
    }

    #[test]
    fn test_flagged_generic_penalty() {
        let records = monthly_series("GEICO PAYMENT", &[98.0, 98.0, 98.0], "2025-01-05");
        let report = detector().detect(&records);
        assert_eq!(report.patterns.len(), 1);
        // 0.90 + 0.05 (no variance) - 0.05 (generic word)
        assert!((report.patterns[0].confidence - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_low_confidence_filtered() {
        let config = DetectionConfig {
            min_confidence: 0.99,
            ..Default::default()
        };
        let detector = RecurringDetector::new(config).unwrap();
        let records = monthly_series("PLANET FITNESS", &[24.99, 24.99, 24.99], "2025-01-05");
        let report = detector.detect(&records);
        assert!(report.patterns.is_empty());
        assert_eq!(report.stats.false_positives_filtered, 1);
        assert_eq!(report.stats.false_positive_rate(), 1.0);
    }

    #[test]
    fn test_sort_order() {
        let mut records = monthly_series("NETFLIX", &[15.99; 6], "2025-01-15");
        records.extend(monthly_series("HULU", &[7.99; 3], "2025-01-01"));
        records.extend(monthly_series("DISNEY PLUS", &[7.99; 3], "2025-01-01"));
        records.extend(monthly_series(
            "CITY UTILITIES",
            &[40.0, 50.0, 45.0, 55.0, 42.0, 48.0],
            "2025-01-10",
        ));

        let report = detector().detect(&records);
        let keys: Vec<&str> = report
            .patterns
            .iter()
            .map(|p| p.normalized_key.as_str())
            .collect();
        // netflix has the occurrence bonus; equal hulu/disney scores sort by key
        assert_eq!(keys, vec!["netflix", "disney plus", "hulu", "city utilities"]);

        for pair in report.patterns.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut records = monthly_series("NETFLIX", &[15.99; 4], "2025-01-15");
        records.extend(interval_series("PAYROLL SERVICE", &[9.0; 5], "2025-01-03", 14));
        records.extend(monthly_series("WATER DEPT", &[30.0, 36.0, 33.0, 39.0], "2025-01-09"));
        records.push(record("x", "HARDWARE STORE", 12.0, "2025-02-02"));

        let sequential = detector().detect(&records);
        let parallel = RecurringDetector::new(DetectionConfig {
            worker_threads: 4,
            ..Default::default()
        })
        .unwrap()
        .detect(&records);

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_custom_layers() {
        let detector = detector().with_layers(Vec::new());
        let records = monthly_series("NETFLIX", &[15.99; 4], "2025-01-15");
        let report = detector.detect(&records);
        assert!(report.patterns.is_empty());
        assert_eq!(report.stats.no_layer_matched, 1);
    }

    #[test]
    fn test_resolver_merges_variants() {
        struct StaticResolver;
        impl MerchantResolver for StaticResolver {
            fn resolve(&self, raw: &str) -> Option<String> {
                raw.starts_with("PGE").then(|| "Pacific Gas and Electric".to_string())
            }
        }

        let detector = detector().with_resolver(Box::new(StaticResolver));
        let records = vec![
            record("1", "PGE WEB ONLINE", 80.0, "2025-01-12"),
            record("2", "PGE*PAYMENT 8842", 80.0, "2025-02-12"),
            record("3", "PGE ENERGY", 80.0, "2025-03-12"),
        ];
        let report = detector.detect(&records);
        assert_eq!(report.patterns.len(), 1);
        assert_eq!(report.patterns[0].normalized_key, "pacific gas and electric");
    }

    #[test]
    fn test_predict_bills_window_and_roll_forward() {
        let records = vec![
            record("1", "Netflix", 15.99, "2025-01-15"),
            record("2", "Netflix", 15.99, "2025-02-15"),
            record("3", "Netflix", 15.99, "2025-03-15"),
        ];
        let mut variable = monthly_series(
            "CITY UTILITIES",
            &[40.0, 50.0, 45.0, 55.0, 42.0, 48.0],
            "2024-10-10",
        );
        variable.extend(records);
        let report = detector().detect(&variable);
        assert_eq!(report.patterns.len(), 2);

        // Netflix next is 2025-04-14; utilities next is 2025-04-10
        let predictions = predict_bills(&report.patterns, date("2025-04-01"), 30);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].normalized_key, "city utilities");
        assert!(matches!(predictions[0].expected_amount, ExpectedAmount::Range { .. }));
        assert_eq!(predictions[1].expected_date, date("2025-04-14"));
        assert_eq!(
            predictions[1].expected_amount,
            ExpectedAmount::Exact { amount: 15.99 }
        );

        // Two months later the Netflix date rolls forward by 30-day steps
        let later = predict_bills(&report.patterns, date("2025-06-01"), 15);
        let netflix: Vec<_> = later
            .iter()
            .filter(|p| p.normalized_key == "netflix")
            .collect();
        assert_eq!(netflix.len(), 1);
        assert_eq!(netflix[0].expected_date, date("2025-06-13"));

        assert!(predict_bills(&report.patterns, date("2025-04-01"), 3).is_empty());
    }

    fn netflix_report() -> DetectionReport {
        let records = vec![
            record("1", "Netflix", 15.99, "2025-01-15"),
            record("2", "Netflix", 15.99, "2025-02-15"),
            record("3", "Netflix", 15.99, "2025-03-15"),
        ];
        detector().detect(&records)
    }

    #[test]
    fn test_predict_bills_unbounded_window() {
        let report = netflix_report();

        let all = predict_bills(&report.patterns, date("2025-04-01"), i64::MAX);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].expected_date, date("2025-04-14"));

        // Rolling forward past the last representable date drops the bill
        let at_end = predict_bills(&report.patterns, NaiveDate::MAX, 30);
        assert!(at_end.len() <= 1);
    }

    #[test]
    fn test_predict_uses_configured_window() {
        let report = netflix_report();

        let wide = RecurringDetector::new(DetectionConfig {
            lookahead_days: 200_000_000,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(wide.predict(&report.patterns, date("2025-04-01")).len(), 1);

        let narrow = RecurringDetector::new(DetectionConfig {
            lookahead_days: 3,
            ..Default::default()
        })
        .unwrap();
        assert!(narrow.predict(&report.patterns, date("2025-04-01")).is_empty());
    }

    #[test]
    fn test_detect_transactions_matches_detect() {
        let mut records = monthly_series("NETFLIX", &[15.99; 4], "2025-01-15");
        records.extend(monthly_series("HULU", &[7.99; 3], "2025-01-01"));
        let txs = transactions(&records);

        let from_records = detector().detect(&records);
        let from_transactions = detector().detect_transactions(&txs);

        assert_eq!(from_transactions.patterns, from_records.patterns);
        assert_eq!(from_transactions.stats.records_received, 7);
        assert_eq!(from_transactions.stats, from_records.stats);
        assert!(from_transactions.warnings.is_empty());
    }

    #[test]
    fn test_two_monthly_charges_are_not_a_pattern() {
        let records = vec![
            record("1", "Netflix", 15.99, "2025-01-15"),
            record("2", "Netflix", 15.99, "2025-02-15"),
        ];
        let report = detector().detect(&records);

        assert!(report.patterns.is_empty());
        assert_eq!(report.stats.total_groups_evaluated, 1);
        assert_eq!(report.stats.no_layer_matched, 1);
        assert_eq!(report.stats.patterns_emitted(), 0);
    }

    #[test]
    fn test_occurrences_below_raised_minimum_are_dropped() {
        let detector = RecurringDetector::new(DetectionConfig {
            min_occurrences: 5,
            ..Default::default()
        })
        .unwrap();
        let records = monthly_series("PLANET FITNESS", &[24.99; 4], "2025-01-05");
        let report = detector.detect(&records);

        assert!(report.patterns.is_empty());
        assert_eq!(report.stats.no_layer_matched, 1);
    }
}
