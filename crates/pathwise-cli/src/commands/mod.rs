//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `plan` - Savings plan commands (allocate, rebalance, step, pretax)
//! - `leaps` - Recommendation feed commands (leaps, ef-gate)
//! - `config` - Engine configuration commands (show, path)

pub mod config;
pub mod leaps;
pub mod plan;

// Re-export command functions for main.rs
pub use config::*;
pub use leaps::*;
pub use plan::*;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pathwise_core::PlannerConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Load engine config from `--config`, the user override, or the built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let config = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found: {}", p.display());
            }
            PlannerConfig::load_from(p)
        }
        None => PlannerConfig::load(),
    };
    config.context("Failed to load planner config")
}

/// Read and parse a JSON input record
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
