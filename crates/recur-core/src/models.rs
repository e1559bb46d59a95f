//! Domain models for Recur

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A transaction record as delivered by an upstream source.
///
/// Fields may be missing; [`TransactionRecord::validate`] turns a complete
/// record into a [`Transaction`] or reports why it is unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "description", alias = "merchant", default)]
    pub merchant_description: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl TransactionRecord {
    /// Build a complete record
    pub fn new(
        id: impl Into<String>,
        merchant_description: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            merchant_description: merchant_description.into(),
            amount: Some(amount),
            date: Some(date),
        }
    }

    pub fn validate(&self) -> Result<Transaction, WarningKind> {
        if self.merchant_description.trim().is_empty() {
            return Err(WarningKind::BlankDescription);
        }
        let date = self.date.ok_or(WarningKind::MissingDate)?;
        let amount = self.amount.ok_or(WarningKind::MissingAmount)?;
        if !amount.is_finite() {
            return Err(WarningKind::InvalidAmount);
        }

        Ok(Transaction {
            id: self.id.clone(),
            merchant_description: self.merchant_description.clone(),
            amount,
            date,
        })
    }
}

/// A validated financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub merchant_description: String,
    /// Signed amount; charges and refunds carry opposite signs
    pub amount: f64,
    pub date: NaiveDate,
}

/// How stable the amount of a recurring pattern is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Same amount every time (subscriptions)
    Fixed,
    /// Amount moves within a band (utility bills)
    Variable,
    /// Infrequent charges, quarterly or annual
    Irregular,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Variable => "variable",
            Self::Irregular => "irregular",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classified recurrence interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Biweekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Inclusive range of median day gaps that classify as this cadence
    pub fn day_range(&self) -> (f64, f64) {
        match self {
            Self::Biweekly => (13.0, 15.0),
            Self::Monthly => (28.0, 32.0),
            Self::Quarterly => (85.0, 95.0),
            Self::Annual => (360.0, 370.0),
        }
    }

    pub fn all() -> &'static [Cadence] {
        &[
            Self::Biweekly,
            Self::Monthly,
            Self::Quarterly,
            Self::Annual,
        ]
    }

    /// Classify a median gap in days
    pub fn from_median_days(median: f64) -> Option<Self> {
        Self::all().iter().copied().find(|cadence| {
            let (low, high) = cadence.day_range();
            median >= low && median <= high
        })
    }

    /// Whether this cadence is infrequent enough for the irregular layer
    pub fn is_infrequent(&self) -> bool {
        matches!(self, Self::Quarterly | Self::Annual)
    }
}

impl std::str::FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(format!("Unknown cadence: {}", s)),
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurring payment pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPattern {
    /// Most representative raw description in the group
    pub merchant_name: String,
    pub normalized_key: String,
    pub pattern_type: PatternType,
    pub cadence: Cadence,
    /// Typical amount (fixed and irregular patterns)
    pub amount: Option<f64>,
    /// Expected band as (min, max) (variable patterns)
    pub amount_range: Option<(f64, f64)>,
    /// Amount variability as a fraction (0.12 = 12%)
    pub amount_variance_pct: f64,
    pub occurrence_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub next_expected_date: NaiveDate,
    pub median_interval_days: f64,
    /// Sample standard deviation of day gaps
    pub date_std_dev: f64,
    /// Always in [0, 1]
    pub confidence: f64,
    pub reasoning: String,
}

/// Expected amount of an upcoming bill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedAmount {
    Exact { amount: f64 },
    Range { min: f64, max: f64 },
}

impl std::fmt::Display for ExpectedAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact { amount } => write!(f, "${:.2}", amount),
            Self::Range { min, max } => write!(f, "${:.2}-${:.2}", min, max),
        }
    }
}

/// An upcoming charge derived from a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillPrediction {
    pub merchant_name: String,
    pub normalized_key: String,
    pub expected_date: NaiveDate,
    pub expected_amount: ExpectedAmount,
    pub confidence: f64,
    pub cadence: Cadence,
}

/// Why a record was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingDate,
    MissingAmount,
    /// Amount present but not a finite number
    InvalidAmount,
    BlankDescription,
    /// Description normalizes to an empty key
    UnidentifiableMerchant,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingDate => "missing_date",
            Self::MissingAmount => "missing_amount",
            Self::InvalidAmount => "invalid_amount",
            Self::BlankDescription => "blank_description",
            Self::UnidentifiableMerchant => "unidentifiable_merchant",
        }
    }
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A malformed record that was recorded and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataWarning {
    pub record_id: String,
    pub kind: WarningKind,
}

/// Counters for a single detection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub records_received: usize,
    /// Malformed records (see warnings)
    pub records_skipped: usize,
    /// Records whose merchant key is entirely generic (ATM, TRANSFER, ...)
    pub generic_excluded: usize,
    /// Minority-sign records removed from mixed-sign groups
    pub refunds_excluded: usize,
    pub total_groups_evaluated: usize,
    pub no_cadence: usize,
    pub no_layer_matched: usize,
    pub fixed_patterns: usize,
    pub variable_patterns: usize,
    pub irregular_patterns: usize,
    pub false_positives_filtered: usize,
}

impl DetectionStats {
    pub fn patterns_emitted(&self) -> usize {
        self.fixed_patterns + self.variable_patterns + self.irregular_patterns
    }

    /// Candidates accepted by a layer, before filtering
    pub fn candidates(&self) -> usize {
        self.patterns_emitted() + self.false_positives_filtered
    }

    /// Fraction of candidates rejected by the false-positive filter
    pub fn false_positive_rate(&self) -> f64 {
        let candidates = self.candidates();
        if candidates == 0 {
            return 0.0;
        }
        self.false_positives_filtered as f64 / candidates as f64
    }

    pub(crate) fn record_pattern(&mut self, pattern_type: PatternType) {
        match pattern_type {
            PatternType::Fixed => self.fixed_patterns += 1,
            PatternType::Variable => self.variable_patterns += 1,
            PatternType::Irregular => self.irregular_patterns += 1,
        }
    }
}

/// Results of running detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Sorted by confidence, then occurrence count, then key
    pub patterns: Vec<RecurringPattern>,
    pub stats: DetectionStats,
    pub warnings: Vec<DataWarning>,
}
