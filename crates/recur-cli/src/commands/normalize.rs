//! Normalize command implementation

use std::path::Path;

use anyhow::Result;
use recur_core::RecurringDetector;

use super::{load_config, truncate};

pub fn cmd_normalize(config_path: Option<&Path>, descriptions: &[String]) -> Result<()> {
    let detector = RecurringDetector::new(load_config(config_path)?)?;
    let normalizer = detector.normalizer();

    for description in descriptions {
        let key = normalizer.canonical_key(description, None);
        let note = if key.is_empty() {
            " (unidentifiable)"
        } else if normalizer.is_generic(&key) {
            " (generic, excluded)"
        } else if normalizer.alias_for(description).is_some() {
            " (alias)"
        } else {
            ""
        };
        println!("   {:32} → {}{}", truncate(description, 32), key, note);
    }

    Ok(())
}
