//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Recur - Find the charges that keep coming back
#[derive(Parser)]
#[command(name = "recur")]
#[command(about = "Recurring transaction and upcoming bill detector", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Detection config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect recurring patterns in a transaction file
    Detect {
        /// CSV or JSON file of transactions
        #[arg(short, long)]
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Minimum occurrences for fixed and variable patterns
        #[arg(long)]
        min_occurrences: Option<usize>,

        /// Fuzzy merchant similarity threshold (0-100)
        #[arg(long)]
        threshold: Option<u8>,

        /// Worker threads for group evaluation
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Predict upcoming bills from detected patterns
    Predict {
        /// CSV or JSON file of transactions
        #[arg(short, long)]
        file: PathBuf,

        /// Look-ahead window in days (defaults to the configured value)
        #[arg(short, long)]
        days: Option<i64>,

        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<String>,

        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the canonical merchant key for descriptions
    Normalize {
        /// Raw bank descriptions
        #[arg(required = true)]
        descriptions: Vec<String>,
    },

    /// Print the effective detection configuration as TOML
    Config,
}
