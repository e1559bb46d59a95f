//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Config display and the shared config/record loading helpers
//! - `detect` - Recurring pattern detection
//! - `normalize` - Merchant key inspection
//! - `predict` - Upcoming bill predictions

pub mod config;
pub mod detect;
pub mod normalize;
pub mod predict;

// Re-export command functions for main.rs
pub use config::*;
pub use detect::*;
pub use normalize::*;
pub use predict::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
