//! Recur CLI - Recurring transaction detector
//!
//! Usage:
//!   recur detect --file CSV        Find recurring charges
//!   recur predict --file CSV       List bills due in the next 30 days
//!   recur normalize "SQ *BLUE..."   Show the canonical merchant key
//!   recur config                   Print the effective configuration

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Detect {
            file,
            json,
            min_occurrences,
            threshold,
            workers,
        } => {
            let overrides = commands::DetectOverrides {
                min_occurrences,
                threshold,
                workers,
            };
            commands::cmd_detect(config_path, &file, &overrides, json)
        }
        Commands::Predict {
            file,
            days,
            today,
            json,
        } => commands::cmd_predict(config_path, &file, days, today.as_deref(), json),
        Commands::Normalize { descriptions } => commands::cmd_normalize(config_path, &descriptions),
        Commands::Config => commands::cmd_config(config_path),
    }
}
