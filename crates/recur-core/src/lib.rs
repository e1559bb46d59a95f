//! Recur Core Library
//!
//! Recurring-transaction pattern detection:
//! - Merchant normalization and fuzzy grouping of description variants
//! - Cadence analysis over irregular date series
//! - Layered fixed / variable / irregular amount detectors
//! - Confidence scoring and false-positive filtering
//! - Next-occurrence and upcoming bill predictions
//! - CSV and JSON record loading

pub mod cadence;
pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod layers;
pub mod models;
pub mod normalize;
pub mod scoring;
pub mod stats;

/// Test utilities including transaction record builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cadence::{analyze_cadence, CadenceAnalysis};
pub use config::DetectionConfig;
pub use detect::{predict_bills, RecurringDetector};
pub use error::{Error, Result};
pub use import::{load_records, parse_csv, parse_json};
pub use layers::{default_layers, Candidate, DetectionLayer};
pub use models::{
    BillPrediction, Cadence, DataWarning, DetectionReport, DetectionStats, ExpectedAmount,
    PatternType, RecurringPattern, Transaction, TransactionRecord, WarningKind,
};
pub use normalize::{similarity, MerchantGroup, MerchantNormalizer, MerchantResolver};
pub use scoring::{confidence_score, filter_candidate, FilterReason, ScoreFactors};
