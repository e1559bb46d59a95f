//! Confidence scoring and false-positive filtering

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::models::{PatternType, RecurringPattern};

/// Attributes of a candidate that feed the confidence score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreFactors {
    pub pattern_type: PatternType,
    pub occurrence_count: usize,
    pub date_std_dev: f64,
    pub amount_variance_pct: f64,
    /// Key contains a generic descriptor word
    pub flagged_generic: bool,
}

fn base_confidence(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::Fixed => 0.90,
        PatternType::Variable => 0.70,
        PatternType::Irregular => 0.60,
    }
}

/// Deterministic confidence in [0, 1]
pub fn confidence_score(factors: &ScoreFactors, config: &DetectionConfig) -> f64 {
    let extra_occurrences = factors.occurrence_count as f64 - config.min_occurrences as f64;
    let occurrence_bonus = (extra_occurrences * 0.05).clamp(0.0, 0.15);
    let date_bonus = if factors.date_std_dev < 2.0 { 0.05 } else { 0.0 };
    let amount_bonus = if factors.amount_variance_pct < 0.01 {
        0.05
    } else {
        0.0
    };
    let variance_penalty = if factors.amount_variance_pct > 0.10 {
        -0.10
    } else {
        0.0
    };
    let generic_penalty = if factors.flagged_generic { -0.05 } else { 0.0 };

    let score = base_confidence(factors.pattern_type)
        + occurrence_bonus
        + date_bonus
        + amount_bonus
        + variance_penalty
        + generic_penalty;
    score.clamp(0.0, 1.0)
}

/// Why a candidate pattern was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    TooFewOccurrences,
    ExcessiveVariance,
    LowConfidence,
    GenericMerchant,
}

impl FilterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooFewOccurrences => "too_few_occurrences",
            Self::ExcessiveVariance => "excessive_variance",
            Self::LowConfidence => "low_confidence",
            Self::GenericMerchant => "generic_merchant",
        }
    }
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First rule the pattern breaks, or `None` if it may be returned.
///
/// `layer_min_occurrences` is the minimum of the layer that accepted it.
pub fn filter_candidate(
    pattern: &RecurringPattern,
    layer_min_occurrences: usize,
    is_generic: bool,
    config: &DetectionConfig,
) -> Option<FilterReason> {
    if pattern.occurrence_count < layer_min_occurrences {
        return Some(FilterReason::TooFewOccurrences);
    }
    if pattern.amount_variance_pct > config.max_variance_pct {
        return Some(FilterReason::ExcessiveVariance);
    }
    if pattern.confidence < config.min_confidence {
        return Some(FilterReason::LowConfidence);
    }
    if is_generic {
        return Some(FilterReason::GenericMerchant);
    }
    None
}
