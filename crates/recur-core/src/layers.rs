//! Layered pattern detectors
//!
//! Each layer tests a merchant group against its own amount-stability
//! criteria. Layers are tried in order and the first acceptance wins:
//! 1. [`FixedAmountLayer`]: same price every time
//! 2. [`VariableAmountLayer`]: price moves within a band
//! 3. [`IrregularLayer`]: infrequent quarterly/annual charges
//!
//! New layers implement [`DetectionLayer`] and are added to the list passed
//! to the detector; existing layers do not change.

use crate::cadence::CadenceAnalysis;
use crate::config::DetectionConfig;
use crate::models::PatternType;
use crate::stats::{coefficient_of_variation, mean, sample_std_dev, spread};

/// Amount statistics of a group, computed on magnitudes
#[derive(Debug, Clone, PartialEq)]
pub struct AmountProfile {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Largest minus smallest amount
    pub spread: f64,
    /// Coefficient of variation
    pub cv: f64,
}

impl AmountProfile {
    pub fn from_amounts(amounts: &[f64]) -> Self {
        let magnitudes: Vec<f64> = amounts.iter().map(|a| a.abs()).collect();
        Self {
            count: magnitudes.len(),
            mean: mean(&magnitudes),
            std_dev: sample_std_dev(&magnitudes),
            spread: spread(&magnitudes),
            cv: coefficient_of_variation(&magnitudes),
        }
    }

    /// Spread relative to the mean; the variance proxy for two-point groups
    pub fn relative_spread(&self) -> f64 {
        if self.mean < f64::EPSILON {
            return 0.0;
        }
        self.spread / self.mean
    }
}

/// A layer's acceptance of a group, before scoring and filtering
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub pattern_type: PatternType,
    /// Typical magnitude (fixed and irregular)
    pub amount: Option<f64>,
    /// Expected magnitude band (variable)
    pub amount_range: Option<(f64, f64)>,
    pub amount_variance_pct: f64,
    /// Occurrences this layer requires; checked again by the filter
    pub min_occurrences: usize,
    pub rationale: String,
}

/// One strategy in the layered detection policy
pub trait DetectionLayer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Accept the group, or pass it to the next layer with `None`
    fn evaluate(
        &self,
        amounts: &AmountProfile,
        cadence: &CadenceAnalysis,
        config: &DetectionConfig,
    ) -> Option<Candidate>;
}

/// Layers in their default order
pub fn default_layers() -> Vec<Box<dyn DetectionLayer>> {
    vec![
        Box::new(FixedAmountLayer),
        Box::new(VariableAmountLayer),
        Box::new(IrregularLayer),
    ]
}

/// Run layers in order; first acceptance wins
pub fn first_match(
    layers: &[Box<dyn DetectionLayer>],
    amounts: &AmountProfile,
    cadence: &CadenceAnalysis,
    config: &DetectionConfig,
) -> Option<Candidate> {
    layers
        .iter()
        .find_map(|layer| layer.evaluate(amounts, cadence, config))
}

/// Same amount on a steady schedule
pub struct FixedAmountLayer;

impl DetectionLayer for FixedAmountLayer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn evaluate(
        &self,
        amounts: &AmountProfile,
        cadence: &CadenceAnalysis,
        config: &DetectionConfig,
    ) -> Option<Candidate> {
        let allowed_spread = (config.amount_tolerance * amounts.mean).max(config.fixed_amount_floor);
        if amounts.count < config.min_occurrences
            || amounts.spread > allowed_spread
            || cadence.date_std_dev > config.date_tolerance_days as f64
        {
            return None;
        }

        Some(Candidate {
            pattern_type: PatternType::Fixed,
            amount: Some(amounts.mean),
            amount_range: None,
            amount_variance_pct: amounts.cv,
            min_occurrences: config.min_occurrences,
            rationale: format!(
                "amounts within ${:.2} of each other (allowed ${:.2})",
                amounts.spread, allowed_spread
            ),
        })
    }
}

/// Amount varies moderately around a stable mean
pub struct VariableAmountLayer;

impl DetectionLayer for VariableAmountLayer {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn evaluate(
        &self,
        amounts: &AmountProfile,
        _cadence: &CadenceAnalysis,
        config: &DetectionConfig,
    ) -> Option<Candidate> {
        if amounts.count < config.min_occurrences
            || amounts.cv <= config.variable_cv_min
            || amounts.cv >= config.variable_cv_max
        {
            return None;
        }

        let band = 2.0 * amounts.std_dev;
        Some(Candidate {
            pattern_type: PatternType::Variable,
            amount: None,
            amount_range: Some((amounts.mean - band, amounts.mean + band)),
            amount_variance_pct: amounts.cv,
            min_occurrences: config.min_occurrences,
            rationale: format!(
                "amounts vary {:.1}% around ${:.2}",
                amounts.cv * 100.0,
                amounts.mean
            ),
        })
    }
}

/// Quarterly or annual charges, where few samples are expected
pub struct IrregularLayer;

impl DetectionLayer for IrregularLayer {
    fn name(&self) -> &'static str {
        "irregular"
    }

    fn evaluate(
        &self,
        amounts: &AmountProfile,
        cadence: &CadenceAnalysis,
        config: &DetectionConfig,
    ) -> Option<Candidate> {
        let allowed_spread =
            (config.irregular_amount_tolerance * amounts.mean).max(config.irregular_amount_floor);
        if !cadence.cadence.is_infrequent()
            || amounts.count < config.irregular_min_occurrences
            || amounts.spread > allowed_spread
        {
            return None;
        }

        // Two points have no meaningful sample variance
        let amount_variance_pct = if amounts.count == 2 {
            amounts.relative_spread()
        } else {
            amounts.cv
        };

        Some(Candidate {
            pattern_type: PatternType::Irregular,
            amount: Some(amounts.mean),
            amount_range: None,
            amount_variance_pct,
            min_occurrences: config.irregular_min_occurrences,
            rationale: format!(
                "{} {} charges within ${:.2} of each other",
                amounts.count, cadence.cadence, amounts.spread
            ),
        })
    }
}
