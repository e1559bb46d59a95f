//! Detection configuration
//!
//! Every tunable used by the detection pipeline lives in [`DetectionConfig`].
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), else the override in the data dir
//!    (~/.local/share/recur/config/detection.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Out-of-range values fail at load time with [`Error::Config`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/detection.toml");

/// Detection configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Minimum occurrences for fixed and variable patterns
    pub min_occurrences: usize,
    /// Allowed amount spread for fixed patterns, as a fraction of the mean
    pub amount_tolerance: f64,
    /// Maximum standard deviation of day gaps for fixed patterns
    pub date_tolerance_days: i64,
    /// Similarity (0-100) a key must exceed to merge into an existing group
    pub fuzzy_similarity_threshold: u8,

    // Layer tuning
    /// Absolute spread always accepted for fixed patterns (dollars)
    pub fixed_amount_floor: f64,
    /// Lower CV bound (exclusive) for variable patterns
    pub variable_cv_min: f64,
    /// Upper CV bound (exclusive) for variable patterns
    pub variable_cv_max: f64,
    /// Minimum occurrences for quarterly/annual irregular patterns
    pub irregular_min_occurrences: usize,
    /// Allowed amount spread for irregular patterns, as a fraction of the mean
    pub irregular_amount_tolerance: f64,
    /// Absolute spread always accepted for irregular patterns (dollars)
    pub irregular_amount_floor: f64,

    // False-positive filter
    pub max_variance_pct: f64,
    pub min_confidence: f64,

    // Runtime
    /// Worker threads for group evaluation (1 = sequential)
    pub worker_threads: usize,
    /// Look-ahead window for bill predictions
    pub lookahead_days: i64,

    /// Extra alias patterns mapped to canonical merchant names
    pub aliases: BTreeMap<String, String>,
    /// Extra generic descriptor words
    pub generic_terms: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            amount_tolerance: 0.02,  // ±2%
            date_tolerance_days: 7,
            fuzzy_similarity_threshold: 80,
            fixed_amount_floor: 0.50,
            variable_cv_min: 0.10,
            variable_cv_max: 0.30,
            irregular_min_occurrences: 2,
            irregular_amount_tolerance: 0.05, // ±5%
            irregular_amount_floor: 1.00,
            max_variance_pct: 0.30,
            min_confidence: 0.50,
            worker_threads: 1,
            lookahead_days: 30,
            aliases: BTreeMap::new(),
            generic_terms: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Load configuration (override first, then default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path() {
                Some(path) if path.exists() => fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let config = raw.apply(Self::default());
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration in the file format
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&RawConfig::from(self))
            .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))
    }

    /// Check every tunable is in range
    pub fn validate(&self) -> Result<()> {
        if self.min_occurrences < 2 {
            return Err(invalid("min_occurrences", "must be at least 2"));
        }
        if !(self.amount_tolerance > 0.0 && self.amount_tolerance <= 1.0) {
            return Err(invalid("amount_tolerance", "must be in (0, 1]"));
        }
        if self.date_tolerance_days < 0 {
            return Err(invalid("date_tolerance_days", "must not be negative"));
        }
        if self.fuzzy_similarity_threshold > 100 {
            return Err(invalid("fuzzy_similarity_threshold", "must be in 0-100"));
        }
        if !(self.fixed_amount_floor >= 0.0 && self.fixed_amount_floor.is_finite()) {
            return Err(invalid("fixed_amount_floor", "must be a non-negative number"));
        }
        if !(self.variable_cv_min >= 0.0 && self.variable_cv_min < self.variable_cv_max) {
            return Err(invalid(
                "variable_cv_min",
                "must be non-negative and below variable_cv_max",
            ));
        }
        if !self.variable_cv_max.is_finite() {
            return Err(invalid("variable_cv_max", "must be finite"));
        }
        if self.irregular_min_occurrences < 2 {
            return Err(invalid("irregular_min_occurrences", "must be at least 2"));
        }
        if !(self.irregular_amount_tolerance > 0.0 && self.irregular_amount_tolerance <= 1.0) {
            return Err(invalid("irregular_amount_tolerance", "must be in (0, 1]"));
        }
        if !(self.irregular_amount_floor >= 0.0 && self.irregular_amount_floor.is_finite()) {
            return Err(invalid(
                "irregular_amount_floor",
                "must be a non-negative number",
            ));
        }
        if !(self.max_variance_pct >= 0.0 && self.max_variance_pct.is_finite()) {
            return Err(invalid("max_variance_pct", "must be a non-negative number"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid("min_confidence", "must be in [0, 1]"));
        }
        if self.worker_threads == 0 {
            return Err(invalid("worker_threads", "must be at least 1"));
        }
        if self.lookahead_days < 0 {
            return Err(invalid("lookahead_days", "must not be negative"));
        }
        for (pattern, canonical) in &self.aliases {
            if pattern.trim().is_empty() || canonical.trim().is_empty() {
                return Err(invalid("aliases", "patterns and names must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::Config(format!("{} {}", field, reason))
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("recur").join("config").join("detection.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawConfig {
    thresholds: Option<RawThresholds>,
    layers: Option<RawLayers>,
    filter: Option<RawFilter>,
    runtime: Option<RawRuntime>,
    aliases: Option<BTreeMap<String, String>>,
    generic: Option<RawGeneric>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawThresholds {
    min_occurrences: Option<usize>,
    amount_tolerance: Option<f64>,
    date_tolerance_days: Option<i64>,
    fuzzy_similarity_threshold: Option<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawLayers {
    fixed_amount_floor: Option<f64>,
    variable_cv_min: Option<f64>,
    variable_cv_max: Option<f64>,
    irregular_min_occurrences: Option<usize>,
    irregular_amount_tolerance: Option<f64>,
    irregular_amount_floor: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFilter {
    max_variance_pct: Option<f64>,
    min_confidence: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRuntime {
    worker_threads: Option<usize>,
    lookahead_days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawGeneric {
    terms: Option<Vec<String>>,
}

impl RawConfig {
    fn apply(self, mut config: DetectionConfig) -> DetectionConfig {
        if let Some(t) = self.thresholds {
            if let Some(v) = t.min_occurrences {
                config.min_occurrences = v;
            }
            if let Some(v) = t.amount_tolerance {
                config.amount_tolerance = v;
            }
            if let Some(v) = t.date_tolerance_days {
                config.date_tolerance_days = v;
            }
            if let Some(v) = t.fuzzy_similarity_threshold {
                config.fuzzy_similarity_threshold = v;
            }
        }

        if let Some(l) = self.layers {
            if let Some(v) = l.fixed_amount_floor {
                config.fixed_amount_floor = v;
            }
            if let Some(v) = l.variable_cv_min {
                config.variable_cv_min = v;
            }
            if let Some(v) = l.variable_cv_max {
                config.variable_cv_max = v;
            }
            if let Some(v) = l.irregular_min_occurrences {
                config.irregular_min_occurrences = v;
            }
            if let Some(v) = l.irregular_amount_tolerance {
                config.irregular_amount_tolerance = v;
            }
            if let Some(v) = l.irregular_amount_floor {
                config.irregular_amount_floor = v;
            }
        }

        if let Some(f) = self.filter {
            if let Some(v) = f.max_variance_pct {
                config.max_variance_pct = v;
            }
            if let Some(v) = f.min_confidence {
                config.min_confidence = v;
            }
        }

        if let Some(r) = self.runtime {
            if let Some(v) = r.worker_threads {
                config.worker_threads = v;
            }
            if let Some(v) = r.lookahead_days {
                config.lookahead_days = v;
            }
        }

        if let Some(aliases) = self.aliases {
            config.aliases.extend(aliases);
        }
        if let Some(terms) = self.generic.and_then(|g| g.terms) {
            config.generic_terms.extend(terms);
        }

        config
    }
}

impl From<&DetectionConfig> for RawConfig {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            thresholds: Some(RawThresholds {
                min_occurrences: Some(config.min_occurrences),
                amount_tolerance: Some(config.amount_tolerance),
                date_tolerance_days: Some(config.date_tolerance_days),
                fuzzy_similarity_threshold: Some(config.fuzzy_similarity_threshold),
            }),
            layers: Some(RawLayers {
                fixed_amount_floor: Some(config.fixed_amount_floor),
                variable_cv_min: Some(config.variable_cv_min),
                variable_cv_max: Some(config.variable_cv_max),
                irregular_min_occurrences: Some(config.irregular_min_occurrences),
                irregular_amount_tolerance: Some(config.irregular_amount_tolerance),
                irregular_amount_floor: Some(config.irregular_amount_floor),
            }),
            filter: Some(RawFilter {
                max_variance_pct: Some(config.max_variance_pct),
                min_confidence: Some(config.min_confidence),
            }),
            runtime: Some(RawRuntime {
                worker_threads: Some(config.worker_threads),
                lookahead_days: Some(config.lookahead_days),
            }),
            aliases: Some(config.aliases.clone()),
            generic: Some(RawGeneric {
                terms: Some(config.generic_terms.clone()),
            }),
        }
    }
}
