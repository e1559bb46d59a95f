//! Config command and shared loading helpers

use std::path::Path;

use anyhow::{Context, Result};
use recur_core::{import, DetectionConfig, TransactionRecord};
use tracing::debug;

/// Resolve the detection config (explicit path, user override, built-in)
pub fn load_config(config_path: Option<&Path>) -> Result<DetectionConfig> {
    let config = DetectionConfig::load(config_path).context("Failed to load detection config")?;
    match config_path {
        Some(path) => debug!("Loaded config from {}", path.display()),
        None => debug!("Loaded default config"),
    }
    Ok(config)
}

/// Read transaction records from a CSV or JSON file
pub fn load_records(file: &Path) -> Result<Vec<TransactionRecord>> {
    import::load_records(file).with_context(|| format!("Failed to read {}", file.display()))
}

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let rendered = config.to_toml()?;

    match config_path {
        Some(path) => println!("# Effective configuration ({})", path.display()),
        None => println!("# Effective configuration"),
    }
    println!("{}", rendered);
    Ok(())
}
